//! Gate state machine.
//!
//! The machine is pure: callers pass the current time and a random number
//! generator, and persist the [`Gate`] value between requests.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pattern::{Color, Pattern};

/// Delays used by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateTimings {
    /// How long the pattern stays visible.
    pub reveal: Duration,
    /// Pause between a complete replay and the grant.
    pub success_delay: Duration,
    /// How long the error stays up before the gate resets.
    pub failure_delay: Duration,
}

impl Default for GateTimings {
    fn default() -> Self {
        Self {
            reveal: Duration::from_secs(3),
            success_delay: Duration::from_secs(1),
            failure_delay: Duration::from_millis(1500),
        }
    }
}

/// Error message shown after a wrong colour.
pub const WRONG_PATTERN_MESSAGE: &str = "Wrong pattern! Try again.";

/// Current phase. Timed phases own their deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Pattern generated, not shown yet.
    Welcome,
    /// Pattern visible until `hides_at`.
    Pattern { hides_at: DateTime<Utc> },
    /// Collecting the replay.
    Input { entered: Vec<Color> },
    /// A wrong colour was picked; resets at `resets_at`.
    Rejected {
        entered: Vec<Color>,
        resets_at: DateTime<Utc>,
    },
    /// Replay complete; access is granted at `grants_at`.
    Authenticating { grants_at: DateTime<Utc> },
}

impl Phase {
    /// Short name for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Pattern { .. } => "pattern",
            Self::Input { .. } => "input",
            Self::Rejected { .. } => "rejected",
            Self::Authenticating { .. } => "authenticating",
        }
    }

    /// The pending deadline, if this phase has one.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Pattern { hides_at } => Some(*hides_at),
            Self::Rejected { resets_at, .. } => Some(*resets_at),
            Self::Authenticating { grants_at } => Some(*grants_at),
            Self::Welcome | Self::Input { .. } => None,
        }
    }
}

/// An action that is not valid in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} while the gate is in the {phase} phase")]
pub struct GateError {
    pub action: &'static str,
    pub phase: &'static str,
}

/// Something that happened when a deadline passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// The pattern was hidden and input opened.
    PatternHidden,
    /// The failure delay ran out and a new pattern was drawn.
    Reset,
    /// The success delay ran out: the caller should grant access.
    Granted,
}

/// Result of a single colour selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Correct colour, more to go.
    Accepted { entered: usize, total: usize },
    /// Correct colour and the replay is complete.
    Completed,
    /// Wrong colour; the attempt is over.
    Rejected,
}

/// The pattern-lock gate for one browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pattern: Pattern,
    phase: Phase,
    failures: u32,
    timings: GateTimings,
}

impl Gate {
    /// A gate in the welcome phase with a fresh random pattern.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, timings: GateTimings) -> Self {
        Self::with_pattern(Pattern::generate(rng), timings)
    }

    /// A gate in the welcome phase with a known pattern.
    #[must_use]
    pub const fn with_pattern(pattern: Pattern, timings: GateTimings) -> Self {
        Self {
            pattern,
            phase: Phase::Welcome,
            failures: 0,
            timings,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Number of failed attempts in this session.
    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    /// Colours entered so far in the current attempt.
    #[must_use]
    pub fn entered(&self) -> &[Color] {
        match &self.phase {
            Phase::Input { entered } | Phase::Rejected { entered, .. } => entered,
            Phase::Authenticating { .. } => self.pattern.colors(),
            Phase::Welcome | Phase::Pattern { .. } => &[],
        }
    }

    /// `(entered, total)` for the progress indicator.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.entered().len(), self.pattern.len())
    }

    /// Error message to show, if any.
    #[must_use]
    pub const fn error_message(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Rejected { .. } => Some(WRONG_PATTERN_MESSAGE),
            _ => None,
        }
    }

    /// Time left until the pending deadline fires.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let deadline = self.phase.deadline()?;
        Some((deadline - now).to_std().unwrap_or(Duration::ZERO))
    }

    /// Show the pattern.
    ///
    /// # Errors
    ///
    /// Returns an error unless the gate is in the welcome phase.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), GateError> {
        if self.phase != Phase::Welcome {
            return Err(self.invalid("start"));
        }
        self.phase = Phase::Pattern {
            hides_at: after(now, self.timings.reveal),
        };
        Ok(())
    }

    /// Fire the pending deadline if it has passed.
    ///
    /// At most one transition happens per call. `Granted` leaves the phase
    /// unchanged; the caller is expected to discard the gate.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<GateEvent> {
        let due = self.phase.deadline().is_some_and(|deadline| now >= deadline);
        if !due {
            return None;
        }

        match self.phase {
            Phase::Pattern { .. } => {
                self.phase = Phase::Input {
                    entered: Vec::new(),
                };
                Some(GateEvent::PatternHidden)
            }
            Phase::Rejected { .. } => {
                self.reset(rng);
                Some(GateEvent::Reset)
            }
            Phase::Authenticating { .. } => Some(GateEvent::Granted),
            Phase::Welcome | Phase::Input { .. } => None,
        }
    }

    /// Record one colour of the replay.
    ///
    /// # Errors
    ///
    /// Returns an error unless the gate is accepting input.
    pub fn select(&mut self, color: Color, now: DateTime<Utc>) -> Result<Selection, GateError> {
        let phase = self.phase.name();
        let Phase::Input { entered } = &mut self.phase else {
            return Err(GateError {
                action: "select a colour",
                phase,
            });
        };

        let expected = self.pattern.get(entered.len());
        entered.push(color);

        if expected != Some(color) {
            let entered = std::mem::take(entered);
            self.failures += 1;
            self.phase = Phase::Rejected {
                entered,
                resets_at: after(now, self.timings.failure_delay),
            };
            return Ok(Selection::Rejected);
        }

        let entered = entered.len();
        let total = self.pattern.len();
        if entered < total {
            return Ok(Selection::Accepted { entered, total });
        }

        self.phase = Phase::Authenticating {
            grants_at: after(now, self.timings.success_delay),
        };
        Ok(Selection::Completed)
    }

    /// Abandon the attempt and draw a new pattern.
    ///
    /// Any pending reset is discarded along with the phase that owned it.
    ///
    /// # Errors
    ///
    /// Returns an error unless the gate is in the input or rejected phase.
    pub fn new_pattern<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GateError> {
        match self.phase {
            Phase::Input { .. } | Phase::Rejected { .. } => {
                self.reset(rng);
                Ok(())
            }
            _ => Err(self.invalid("draw a new pattern")),
        }
    }

    fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pattern = Pattern::generate(rng);
        self.phase = Phase::Welcome;
    }

    const fn invalid(&self, action: &'static str) -> GateError {
        GateError {
            action,
            phase: self.phase.name(),
        }
    }
}

fn after(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(delay)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(now)
}
