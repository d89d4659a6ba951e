//! Storage trait abstraction.

use async_trait::async_trait;
use syllabus_core::{
    Alert, AlertId, AlertStatus, AlertType, CatchUpPlan, CompletionEvent, Faculty, FacultyId,
    PlanId, PlanStatus, Subject, SubjectId,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Filter for listing alerts.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    /// Only these statuses
    pub status: Option<Vec<AlertStatus>>,
    /// Only this subject
    pub subject: Option<SubjectId>,
    /// Only this alert type
    pub alert_type: Option<AlertType>,
}

impl AlertFilter {
    /// Alerts that are active or pending.
    pub fn open() -> Self {
        Self {
            status: Some(vec![AlertStatus::Active, AlertStatus::Pending]),
            ..Default::default()
        }
    }

    /// Whether an alert passes the filter.
    pub fn matches(&self, alert: &Alert) -> bool {
        if let Some(statuses) = &self.status {
            if !statuses.contains(&alert.status) {
                return false;
            }
        }
        if let Some(subject) = &self.subject {
            if &alert.subject_id != subject {
                return false;
            }
        }
        if let Some(alert_type) = self.alert_type {
            if alert.alert_type != alert_type {
                return false;
            }
        }
        true
    }
}

/// Filter for listing plans.
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    /// Only these statuses
    pub status: Option<Vec<PlanStatus>>,
    /// Only this subject
    pub subject: Option<SubjectId>,
}

impl PlanFilter {
    /// Whether a plan passes the filter.
    pub fn matches(&self, plan: &CatchUpPlan) -> bool {
        if let Some(statuses) = &self.status {
            if !statuses.contains(&plan.status) {
                return false;
            }
        }
        match &self.subject {
            Some(subject) => &plan.subject_id == subject,
            None => true,
        }
    }
}

/// Data-access interface for SyllabusSync.
///
/// The progress and intervention engines only see this trait, so any backend
/// can be plugged in. Listing methods return items in a stable order.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Faculty ===

    /// Save a faculty member (create or update).
    async fn save_faculty(&self, faculty: &Faculty) -> Result<()>;

    /// Load a faculty member by ID.
    async fn load_faculty(&self, id: &FacultyId) -> Result<Option<Faculty>>;

    /// List all faculty, ordered by ID.
    async fn list_faculty(&self) -> Result<Vec<Faculty>>;

    // === Subject trees ===

    /// Save a full subject tree (create or update).
    async fn save_subject(&self, subject: &Subject) -> Result<()>;

    /// Fetch a full subject tree.
    async fn load_subject(&self, id: &SubjectId) -> Result<Option<Subject>>;

    /// List all subject trees, ordered by ID.
    async fn list_subjects(&self) -> Result<Vec<Subject>>;

    // === Alerts ===

    /// Save an alert (create or update).
    async fn save_alert(&self, alert: &Alert) -> Result<()>;

    /// Load an alert by ID.
    async fn load_alert(&self, id: AlertId) -> Result<Option<Alert>>;

    /// List alerts matching the filter, oldest first.
    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>>;

    // === Catch-up plans ===

    /// Save a plan (create or update).
    async fn save_plan(&self, plan: &CatchUpPlan) -> Result<()>;

    /// Load a plan by ID.
    async fn load_plan(&self, id: PlanId) -> Result<Option<CatchUpPlan>>;

    /// List plans matching the filter, oldest first.
    async fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<CatchUpPlan>>;

    // === Completion log ===

    /// Append a completion event.
    async fn append_event(&self, event: &CompletionEvent) -> Result<()>;

    /// List completion events, optionally for one subject, oldest first.
    async fn list_events(&self, subject: Option<&SubjectId>) -> Result<Vec<CompletionEvent>>;
}
