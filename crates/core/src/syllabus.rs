//! Syllabus model - subjects, units and topics.

use serde::{Deserialize, Serialize};
use crate::duration::PlannedDuration;
use crate::id::{FacultyId, SubjectId, TopicId, UnitId};
use crate::Time;

/// An atomic syllabus item, completable, optionally gated by a prerequisite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Identifier, unique within the subject
    pub id: TopicId,

    /// Topic name
    pub name: String,

    /// Whether the topic has been taught
    #[serde(default)]
    pub completed: bool,

    /// When the topic was marked complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Time>,

    /// Topic that should be taught first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<TopicId>,
}

impl Topic {
    /// Create an incomplete topic without a prerequisite.
    pub fn new(id: impl Into<TopicId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            completed: false,
            completed_at: None,
            prerequisite: None,
        }
    }

    /// Set the prerequisite topic.
    pub fn with_prerequisite(mut self, prerequisite: impl Into<TopicId>) -> Self {
        self.prerequisite = Some(prerequisite.into());
        self
    }

    /// Mark complete without a timestamp (authoring time).
    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// A grouping of topics within a subject's syllabus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Identifier, unique within the subject
    pub id: UnitId,

    /// Unit name
    pub name: String,

    /// Planned teaching duration
    #[serde(default)]
    pub duration: PlannedDuration,

    /// Ordered topics
    #[serde(default)]
    pub topics: Vec<Topic>,
}

impl Unit {
    /// Create an empty unit.
    pub fn new(id: impl Into<UnitId>, name: impl Into<String>, duration: PlannedDuration) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration,
            topics: Vec::new(),
        }
    }

    /// Append a topic.
    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topics.push(topic);
        self
    }

    /// Number of completed topics.
    pub fn completed_topics(&self) -> usize {
        self.topics.iter().filter(|t| t.completed).count()
    }
}

/// Derived unit status as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitStatus {
    /// No topics completed
    Pending,
    /// Some topics completed
    InProgress,
    /// Every topic completed
    Completed,
}

impl UnitStatus {
    /// Status for a progress percentage.
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            0 => UnitStatus::Pending,
            100 => UnitStatus::Completed,
            _ => UnitStatus::InProgress,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Pending => "pending",
            UnitStatus::InProgress => "in-progress",
            UnitStatus::Completed => "completed",
        }
    }
}

/// A course owned by one faculty member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique identifier
    pub id: SubjectId,

    /// Course code, e.g. CS301
    pub code: String,

    /// Subject name
    pub name: String,

    /// Owning faculty member
    pub faculty: FacultyId,

    /// Ordered units
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl Subject {
    /// Create a subject without units.
    pub fn new(
        id: impl Into<SubjectId>,
        code: impl Into<String>,
        name: impl Into<String>,
        faculty: impl Into<FacultyId>,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            faculty: faculty.into(),
            units: Vec::new(),
        }
    }

    /// Append a unit.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    /// Iterate every topic in syllabus order.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.units.iter().flat_map(|u| u.topics.iter())
    }

    /// Find a topic anywhere in the subject.
    pub fn topic(&self, id: &TopicId) -> Option<&Topic> {
        self.topics().find(|t| &t.id == id)
    }

    /// Find a topic mutably.
    pub fn topic_mut(&mut self, id: &TopicId) -> Option<&mut Topic> {
        self.units
            .iter_mut()
            .flat_map(|u| u.topics.iter_mut())
            .find(|t| &t.id == id)
    }

    /// Find a unit.
    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| &u.id == id)
    }

    /// Total number of topics.
    pub fn total_topics(&self) -> usize {
        self.units.iter().map(|u| u.topics.len()).sum()
    }

    /// Number of completed topics.
    pub fn completed_topics(&self) -> usize {
        self.units.iter().map(Unit::completed_topics).sum()
    }

    /// Sum of planned unit durations.
    pub fn planned_duration(&self) -> PlannedDuration {
        PlannedDuration::days(self.units.iter().map(|u| u.duration.as_days()).sum())
    }
}
