//! In-memory storage backend.
//!
//! Used by tests and by callers that load a snapshot once per request.

use std::collections::{BTreeMap, HashMap};
use syllabus_core::{
    Alert, AlertId, CatchUpPlan, CompletionEvent, Faculty, FacultyId, PlanId, Subject, SubjectId,
};
use tokio::sync::RwLock;
use super::{AlertFilter, PlanFilter, Storage, Result};

/// Storage backed by in-process maps.
#[derive(Default)]
pub struct MemoryStorage {
    faculty: RwLock<BTreeMap<FacultyId, Faculty>>,
    subjects: RwLock<BTreeMap<SubjectId, Subject>>,
    alerts: RwLock<HashMap<AlertId, Alert>>,
    plans: RwLock<HashMap<PlanId, CatchUpPlan>>,
    events: RwLock<Vec<CompletionEvent>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn save_faculty(&self, faculty: &Faculty) -> Result<()> {
        self.faculty.write().await.insert(faculty.id.clone(), faculty.clone());
        Ok(())
    }

    async fn load_faculty(&self, id: &FacultyId) -> Result<Option<Faculty>> {
        Ok(self.faculty.read().await.get(id).cloned())
    }

    async fn list_faculty(&self) -> Result<Vec<Faculty>> {
        Ok(self.faculty.read().await.values().cloned().collect())
    }

    async fn save_subject(&self, subject: &Subject) -> Result<()> {
        self.subjects.write().await.insert(subject.id.clone(), subject.clone());
        Ok(())
    }

    async fn load_subject(&self, id: &SubjectId) -> Result<Option<Subject>> {
        Ok(self.subjects.read().await.get(id).cloned())
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        Ok(self.subjects.read().await.values().cloned().collect())
    }

    async fn save_alert(&self, alert: &Alert) -> Result<()> {
        self.alerts.write().await.insert(alert.id, alert.clone());
        Ok(())
    }

    async fn load_alert(&self, id: AlertId) -> Result<Option<Alert>> {
        Ok(self.alerts.read().await.get(&id).cloned())
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .read()
            .await
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(alerts)
    }

    async fn save_plan(&self, plan: &CatchUpPlan) -> Result<()> {
        self.plans.write().await.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn load_plan(&self, id: PlanId) -> Result<Option<CatchUpPlan>> {
        Ok(self.plans.read().await.get(&id).cloned())
    }

    async fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<CatchUpPlan>> {
        let mut plans: Vec<CatchUpPlan> = self
            .plans
            .read()
            .await
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(plans)
    }

    async fn append_event(&self, event: &CompletionEvent) -> Result<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn list_events(&self, subject: Option<&SubjectId>) -> Result<Vec<CompletionEvent>> {
        let mut events: Vec<CompletionEvent> = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| subject.map_or(true, |s| &e.subject_id == s))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(events)
    }
}
