//! Unique identifiers for SyllabusSync entities.
//!
//! Authored entities (topics, units, subjects, faculty) are keyed by the short
//! strings chosen when the syllabus is written (`t1`, `unit2`, `cs301`).
//! Records created by the engine (alerts, plans, completion events) get ULIDs.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! authored_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from any string-like key.
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Borrow the raw key.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

macro_rules! generated_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Ulid);

        impl $name {
            /// Generate a new identifier.
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

authored_id!(
    /// Identifier of a Topic, unique within its Subject
    TopicId
);
authored_id!(
    /// Identifier of a Unit, unique within its Subject
    UnitId
);
authored_id!(
    /// Identifier of a Subject (usually the lower-cased course code)
    SubjectId
);
authored_id!(
    /// Identifier of a Faculty member
    FacultyId
);

generated_id!(
    /// Unique identifier for an Alert
    AlertId
);
generated_id!(
    /// Unique identifier for a CatchUpPlan
    PlanId
);
generated_id!(
    /// Unique identifier for a CompletionEvent
    EventId
);
