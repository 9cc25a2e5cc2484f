//! Colour tokens and challenge patterns.

use core::fmt;

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::{Deserialize, Serialize};

/// Error returned when a submitted colour name is not in the alphabet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown colour: {0}")]
pub struct ColorError(pub String);

/// One of the six colours the challenge is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl Color {
    /// The full alphabet, in button order.
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
    ];

    /// Lowercase name, used in forms and as the button label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    /// Swatch colour.
    #[must_use]
    pub const fn hex(&self) -> &'static str {
        match self {
            Self::Red => "#ff4757",
            Self::Blue => "#3742fa",
            Self::Green => "#2ed573",
            Self::Yellow => "#ffa502",
            Self::Purple => "#a55eea",
            Self::Orange => "#ff6348",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|color| color.as_str() == wanted)
            .ok_or_else(|| ColorError(s.to_owned()))
    }
}

impl Distribution<Color> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        match rng.random_range(0..6u8) {
            0 => Color::Red,
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Yellow,
            4 => Color::Purple,
            _ => Color::Orange,
        }
    }
}

/// An ordered challenge sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(Vec<Color>);

impl Pattern {
    /// Shortest generated pattern.
    pub const MIN_LEN: usize = 4;
    /// Longest generated pattern.
    pub const MAX_LEN: usize = 6;

    /// Draw a fresh pattern: length uniform in `MIN_LEN..=MAX_LEN`, every
    /// position an independent uniform colour, repeats allowed.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let len = rng.random_range(Self::MIN_LEN..=Self::MAX_LEN);
        Self((0..len).map(|_| rng.random::<Color>()).collect())
    }

    /// Colours in display order.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    /// Expected colour at a replay position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<Color> {
        self.0.get(position).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Builds a pattern from explicit colours. Generated patterns always have
/// `MIN_LEN..=MAX_LEN` colours; this constructor does not enforce that.
impl From<Vec<Color>> for Pattern {
    fn from(colors: Vec<Color>) -> Self {
        Self(colors)
    }
}
