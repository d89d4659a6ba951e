//! Errors for progress services.

use syllabus_core::{FacultyId, SubjectId, TopicId, UnitId};
use syllabus_storage::StorageError;

/// Result alias for progress services.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors from the ledger, tracker and reports.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Storage failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Subject does not exist
    #[error("subject not found: {0}")]
    SubjectNotFound(SubjectId),

    /// Faculty member does not exist
    #[error("faculty not found: {0}")]
    FacultyNotFound(FacultyId),

    /// Unit does not exist in the subject
    #[error("unit '{unit}' not found in subject '{subject}'")]
    UnitNotFound {
        /// Subject searched
        subject: SubjectId,
        /// Missing unit
        unit: UnitId,
    },

    /// Topic does not exist in the subject or unit
    #[error("topic '{topic}' not found in {scope}")]
    TopicNotFound {
        /// Where the topic was looked up
        scope: String,
        /// Missing topic
        topic: TopicId,
    },

    /// Only the owning faculty may log topics
    #[error("{user} does not own subject {subject}")]
    NotOwner {
        /// Acting user
        user: FacultyId,
        /// Subject being modified
        subject: SubjectId,
    },

    /// A required input was empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
