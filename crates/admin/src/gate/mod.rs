//! Pattern-lock gate.
//!
//! A colour-memory challenge shown before the dashboard. The operator is
//! shown a random sequence of 4 to 6 colours for a few seconds and must
//! replay it from memory.
//!
//! # Not a security boundary
//!
//! Passing the gate sets a plain boolean in the browser session. There is no
//! credential, no rate limiting and no server-side identity. Anyone who can
//! reach the admin port can pass it; network access control is what protects
//! the panel.
//!
//! # States
//!
//! ```text
//! welcome --start--> pattern --(reveal elapsed)--> input
//! input --correct, complete--> authenticating --(delay)--> granted
//! input --wrong--> rejected --(delay)--> welcome (new pattern)
//! input | rejected --new pattern--> welcome (new pattern)
//! ```
//!
//! Each timed state carries its own deadline. Leaving a state for any reason
//! discards that deadline, so a reset can never be followed by a stale
//! transition from the state it replaced.

mod machine;
mod pattern;

pub use machine::{
    Gate, GateError, GateEvent, GateTimings, Phase, Selection, WRONG_PATTERN_MESSAGE,
};
pub use pattern::{Color, ColorError, Pattern};
