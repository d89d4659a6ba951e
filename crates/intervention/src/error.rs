//! Errors for intervention services.

use syllabus_core::{AlertId, FacultyId, PlanId, SubjectId, TransitionError};
use syllabus_progress::ProgressError;
use syllabus_storage::StorageError;

/// Result alias for intervention services.
pub type Result<T> = std::result::Result<T, InterventionError>;

/// Errors from the rule engine and plan lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum InterventionError {
    /// Storage failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Progress computation failure
    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// Plan does not exist
    #[error("plan not found: {0}")]
    PlanNotFound(PlanId),

    /// Alert does not exist
    #[error("alert not found: {0}")]
    AlertNotFound(AlertId),

    /// Subject does not exist
    #[error("subject not found: {0}")]
    SubjectNotFound(SubjectId),

    /// Alert belongs to another subject than the plan
    #[error("alert {alert} is about {actual}, not {expected}")]
    SubjectMismatch {
        /// Alert being attached
        alert: AlertId,
        /// Subject of the plan
        expected: SubjectId,
        /// Subject of the alert
        actual: SubjectId,
    },

    /// The lifecycle does not allow the transition
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// The session may not perform the action
    #[error("{user} is not allowed to {action}")]
    Unauthorized {
        /// Acting user
        user: FacultyId,
        /// Attempted action
        action: &'static str,
    },

    /// A required input was empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
