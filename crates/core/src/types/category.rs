//! Product category.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of the known categories.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

/// The closed set of catalog categories.
///
/// Serialized using the display names the products API stores, e.g.
/// `"Covers & Protectors"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Phones,
    #[serde(rename = "Covers & Protectors")]
    CoversAndProtectors,
    Laptops,
    Accessories,
}

impl Category {
    /// All categories in the order they are offered in forms.
    pub const ALL: [Self; 4] = [
        Self::Phones,
        Self::CoversAndProtectors,
        Self::Laptops,
        Self::Accessories,
    ];

    /// Display name, identical to the wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Phones => "Phones",
            Self::CoversAndProtectors => "Covers & Protectors",
            Self::Laptops => "Laptops",
            Self::Accessories => "Accessories",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}
