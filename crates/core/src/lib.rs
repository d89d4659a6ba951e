//! SyllabusSync core data models.
//!
//! This crate defines the syllabus tree, faculty, intervention alerts and
//! catch-up plans that the progress and intervention engines work on.

#![warn(missing_docs)]

// Core identities
mod id;
mod duration;
mod session;

// Syllabus structure
mod syllabus;
mod faculty;
mod event;

// Interventions
mod alert;
mod plan;
mod lifecycle;

// Re-exports
pub use id::*;
pub use duration::{PlannedDuration, DurationParseError};
pub use session::{Session, Role};

pub use syllabus::{Subject, Unit, Topic, UnitStatus};
pub use faculty::Faculty;
pub use event::CompletionEvent;

pub use alert::{Alert, AlertType, AlertStatus, Severity};
pub use plan::{CatchUpPlan, PlanStatus, PlanOrigin};
pub use lifecycle::TransitionError;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
