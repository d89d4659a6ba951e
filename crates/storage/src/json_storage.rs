//! JSON file storage implementation.
//!
//! Stores one pretty-printed JSON file per object under a data directory:
//!
//! ```text
//! <root>/faculty/<id>.json
//! <root>/subjects/<id>.json
//! <root>/alerts/<id>.json
//! <root>/plans/<id>.json
//! <root>/events/<id>.json
//! ```

use std::path::{Path, PathBuf};
use syllabus_core::{
    Alert, AlertId, CatchUpPlan, CompletionEvent, Faculty, FacultyId, PlanId, Subject, SubjectId,
};
use super::{AlertFilter, PlanFilter, Storage, StorageError, Result};
use tokio::fs;
use tracing::debug;

const KINDS: [&str; 5] = ["faculty", "subjects", "alerts", "plans", "events"];

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Open storage rooted at `root`, creating the per-kind directories.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        for kind in KINDS {
            fs::create_dir_all(root.join(kind)).await?;
        }
        debug!("Opened JSON storage at {}", root.display());

        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, kind: &str, id: &str) -> Result<PathBuf> {
        // Authored ids become file names; keep them inside the kind directory.
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(StorageError::Other(format!("invalid {} id: '{}'", kind, id)));
        }
        Ok(self.root.join(kind).join(format!("{}.json", id)))
    }

    async fn write<T: serde::Serialize>(&self, kind: &str, id: &str, value: &T) -> Result<()> {
        let path = self.path(kind, id)?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_faculty(&self, faculty: &Faculty) -> Result<()> {
        self.write("faculty", faculty.id.as_str(), faculty).await
    }

    async fn load_faculty(&self, id: &FacultyId) -> Result<Option<Faculty>> {
        read_json(&self.path("faculty", id.as_str())?).await
    }

    async fn list_faculty(&self) -> Result<Vec<Faculty>> {
        let mut all: Vec<Faculty> = list_dir(&self.root.join("faculty")).await?;
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn save_subject(&self, subject: &Subject) -> Result<()> {
        self.write("subjects", subject.id.as_str(), subject).await
    }

    async fn load_subject(&self, id: &SubjectId) -> Result<Option<Subject>> {
        read_json(&self.path("subjects", id.as_str())?).await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        let mut all: Vec<Subject> = list_dir(&self.root.join("subjects")).await?;
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn save_alert(&self, alert: &Alert) -> Result<()> {
        self.write("alerts", &alert.id.to_string(), alert).await
    }

    async fn load_alert(&self, id: AlertId) -> Result<Option<Alert>> {
        read_json(&self.path("alerts", &id.to_string())?).await
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        let all: Vec<Alert> = list_dir(&self.root.join("alerts")).await?;
        let mut alerts: Vec<Alert> = all.into_iter().filter(|a| filter.matches(a)).collect();
        alerts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(alerts)
    }

    async fn save_plan(&self, plan: &CatchUpPlan) -> Result<()> {
        self.write("plans", &plan.id.to_string(), plan).await
    }

    async fn load_plan(&self, id: PlanId) -> Result<Option<CatchUpPlan>> {
        read_json(&self.path("plans", &id.to_string())?).await
    }

    async fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<CatchUpPlan>> {
        let all: Vec<CatchUpPlan> = list_dir(&self.root.join("plans")).await?;
        let mut plans: Vec<CatchUpPlan> = all.into_iter().filter(|p| filter.matches(p)).collect();
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(plans)
    }

    async fn append_event(&self, event: &CompletionEvent) -> Result<()> {
        self.write("events", &event.id.to_string(), event).await
    }

    async fn list_events(&self, subject: Option<&SubjectId>) -> Result<Vec<CompletionEvent>> {
        let all: Vec<CompletionEvent> = list_dir(&self.root.join("events")).await?;
        let mut events: Vec<CompletionEvent> = all
            .into_iter()
            .filter(|e| subject.map_or(true, |s| &e.subject_id == s))
            .collect();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(events)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Some(item) = read_json(&entry.path()).await? {
            items.push(item);
        }
    }
    Ok(items)
}
