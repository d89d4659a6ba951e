//! Catch-up plan model and its approval state machine.
//!
//! ```text
//! proposed ──approve──▶ approved
//!     │
//!     └────reject────▶ rejected
//! ```
//!
//! Both outcomes are terminal. Nothing moves a plan automatically.

use serde::{Deserialize, Serialize};
use crate::id::{AlertId, FacultyId, PlanId, SubjectId};
use crate::lifecycle::TransitionError;
use crate::Time;

/// Plan lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// Awaiting a decision
    Proposed,
    /// Accepted by a head of department
    Approved,
    /// Turned down by a head of department
    Rejected,
}

impl PlanStatus {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Proposed => "proposed",
            PlanStatus::Approved => "approved",
            PlanStatus::Rejected => "rejected",
        }
    }
}

/// Who drafted the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanOrigin {
    /// Generated by the rule engine
    Suggested,
    /// Written by a person
    Manual,
}

/// A remediation plan for a subject that fell behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchUpPlan {
    /// Unique identifier
    pub id: PlanId,

    /// Subject to catch up
    pub subject_id: SubjectId,

    /// Faculty owning the subject
    pub faculty_id: FacultyId,

    /// Free-text remediation description
    pub description: String,

    /// Estimated recovery time in days
    pub estimated_recovery_days: u32,

    /// Alerts this plan addresses
    #[serde(default)]
    pub addresses: Vec<AlertId>,

    /// Lifecycle state
    pub status: PlanStatus,

    /// Suggested or manual
    pub origin: PlanOrigin,

    /// When created
    pub created_at: Time,

    /// When approved or rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<Time>,

    /// Who approved or rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<FacultyId>,
}

impl CatchUpPlan {
    /// Create a proposed plan.
    pub fn propose(
        subject_id: SubjectId,
        faculty_id: FacultyId,
        description: impl Into<String>,
        estimated_recovery_days: u32,
        origin: PlanOrigin,
        now: Time,
    ) -> Self {
        Self {
            id: PlanId::new(),
            subject_id,
            faculty_id,
            description: description.into(),
            estimated_recovery_days,
            addresses: Vec::new(),
            status: PlanStatus::Proposed,
            origin,
            created_at: now,
            decided_at: None,
            decided_by: None,
        }
    }

    /// Attach an alert this plan addresses.
    pub fn addressing(mut self, alert: AlertId) -> Self {
        if !self.addresses.contains(&alert) {
            self.addresses.push(alert);
        }
        self
    }

    /// Proposed -> Approved.
    pub fn approve(&mut self, by: FacultyId, now: Time) -> Result<(), TransitionError> {
        self.decide(PlanStatus::Approved, by, now)
    }

    /// Proposed -> Rejected.
    pub fn reject(&mut self, by: FacultyId, now: Time) -> Result<(), TransitionError> {
        self.decide(PlanStatus::Rejected, by, now)
    }

    /// Edit a proposed plan. Decided plans are frozen.
    pub fn revise(
        &mut self,
        description: Option<String>,
        estimated_recovery_days: Option<u32>,
    ) -> Result<(), TransitionError> {
        if self.status != PlanStatus::Proposed {
            return Err(TransitionError::new(self.status.as_str(), PlanStatus::Proposed.as_str()));
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(days) = estimated_recovery_days {
            self.estimated_recovery_days = days;
        }
        Ok(())
    }

    fn decide(&mut self, to: PlanStatus, by: FacultyId, now: Time) -> Result<(), TransitionError> {
        if self.status != PlanStatus::Proposed {
            return Err(TransitionError::new(self.status.as_str(), to.as_str()));
        }
        self.status = to;
        self.decided_at = Some(now);
        self.decided_by = Some(by);
        Ok(())
    }
}
