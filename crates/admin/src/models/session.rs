//! Session keys for gate state.
//!
//! The session holds two entries: the grant flag set once the pattern has
//! been replayed, and the in-progress [`Gate`](crate::gate::Gate).

/// Session keys for admin authentication data.
pub mod keys {
    /// `true` once the pattern has been replayed correctly.
    pub const AUTHENTICATED: &str = "admin_authenticated";

    /// The serialized in-progress gate.
    pub const GATE: &str = "pattern_gate";
}
