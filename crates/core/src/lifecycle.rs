//! Shared lifecycle error.

/// A state transition that the lifecycle does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition from '{from}' to '{to}'")]
pub struct TransitionError {
    /// Current state
    pub from: &'static str,
    /// Requested state
    pub to: &'static str,
}

impl TransitionError {
    /// Create a transition error.
    pub fn new(from: &'static str, to: &'static str) -> Self {
        Self { from, to }
    }
}
