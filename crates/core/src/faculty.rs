//! Faculty model.

use serde::{Deserialize, Serialize};
use crate::id::{FacultyId, SubjectId};

/// A faculty member who owns and teaches subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    /// Unique identifier
    pub id: FacultyId,

    /// Display name
    pub name: String,

    /// Department
    pub department: String,

    /// Owned subjects
    #[serde(default)]
    pub subjects: Vec<SubjectId>,
}

impl Faculty {
    /// Create a faculty member without subjects.
    pub fn new(
        id: impl Into<FacultyId>,
        name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
            subjects: Vec::new(),
        }
    }

    /// Record ownership of a subject.
    pub fn with_subject(mut self, subject: impl Into<SubjectId>) -> Self {
        self.subjects.push(subject.into());
        self
    }
}
