//! Alert model - intervention alerts raised by the rule engine.

use serde::{Deserialize, Serialize};
use crate::id::{AlertId, FacultyId, SubjectId};
use crate::lifecycle::TransitionError;
use crate::Time;

/// Kind of deviation an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    /// Subject progress trails the schedule
    ProgressDelay,
    /// Week-over-week completion rate fell
    VelocityDrop,
    /// A topic was completed before its prerequisite
    PrerequisiteGap,
}

impl AlertType {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::ProgressDelay => "progress-delay",
            AlertType::VelocityDrop => "velocity-drop",
            AlertType::PrerequisiteGap => "prerequisite-gap",
        }
    }
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Low,
    /// Needs attention
    Medium,
    /// Deviation well past its threshold
    High,
}

impl Severity {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Alert lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Raised, nobody has acted yet
    Active,
    /// A catch-up plan is awaiting a decision
    Pending,
    /// Closed by a head of department or an approved plan
    Resolved,
}

impl AlertStatus {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Pending => "pending",
            AlertStatus::Resolved => "resolved",
        }
    }
}

/// An intervention alert for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier
    pub id: AlertId,

    /// Alert type
    pub alert_type: AlertType,

    /// Severity
    pub severity: Severity,

    /// Subject the alert is about
    pub subject_id: SubjectId,

    /// Faculty owning the subject
    pub faculty_id: FacultyId,

    /// Human readable description
    pub description: String,

    /// Lifecycle state
    pub status: AlertStatus,

    /// When created
    pub created_at: Time,

    /// Last time severity, description or status changed
    pub updated_at: Time,
}

impl Alert {
    /// Create an active alert.
    pub fn new(
        alert_type: AlertType,
        severity: Severity,
        subject_id: SubjectId,
        faculty_id: FacultyId,
        description: impl Into<String>,
        now: Time,
    ) -> Self {
        Self {
            id: AlertId::new(),
            alert_type,
            severity,
            subject_id,
            faculty_id,
            description: description.into(),
            status: AlertStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the alert is still open (active or pending).
    pub fn is_open(&self) -> bool {
        self.status != AlertStatus::Resolved
    }

    /// Deduplication key used by the rule engine.
    pub fn key(&self) -> (AlertType, &SubjectId) {
        (self.alert_type, &self.subject_id)
    }

    /// Active -> Pending, when a plan is proposed for it.
    pub fn mark_pending(&mut self, now: Time) -> Result<(), TransitionError> {
        self.transition(AlertStatus::Pending, now)
    }

    /// Pending -> Active, when the plan addressing it is rejected.
    pub fn reopen(&mut self, now: Time) -> Result<(), TransitionError> {
        self.transition(AlertStatus::Active, now)
    }

    /// Active | Pending -> Resolved.
    pub fn resolve(&mut self, now: Time) -> Result<(), TransitionError> {
        self.transition(AlertStatus::Resolved, now)
    }

    fn transition(&mut self, to: AlertStatus, now: Time) -> Result<(), TransitionError> {
        let allowed = matches!(
            (self.status, to),
            (AlertStatus::Active, AlertStatus::Pending)
                | (AlertStatus::Pending, AlertStatus::Active)
                | (AlertStatus::Active, AlertStatus::Resolved)
                | (AlertStatus::Pending, AlertStatus::Resolved)
        );
        if !allowed {
            return Err(TransitionError::new(self.status.as_str(), to.as_str()));
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }
}
