//! Completion event - one entry of the topic ledger's log.

use crate::id::{EventId, FacultyId, SubjectId, TopicId};
use crate::Time;
use serde::{Deserialize, Serialize};

/// A topic completion toggle recorded by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Unique identifier
    pub id: EventId,

    /// Subject containing the topic
    pub subject_id: SubjectId,

    /// Toggled topic
    pub topic_id: TopicId,

    /// Who toggled it
    pub actor: FacultyId,

    /// New completion value
    pub completed: bool,

    /// When it happened
    pub timestamp: Time,
}

impl CompletionEvent {
    /// Create a new event stamped with the given time.
    pub fn new(
        subject_id: SubjectId,
        topic_id: TopicId,
        actor: FacultyId,
        completed: bool,
        timestamp: Time,
    ) -> Self {
        Self {
            id: EventId::new(),
            subject_id,
            topic_id,
            actor,
            completed,
            timestamp,
        }
    }
}
