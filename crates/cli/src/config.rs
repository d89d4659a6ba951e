//! CLI configuration file.

use std::path::Path;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use syllabus_core::{FacultyId, Session};
use syllabus_intervention::{AlertConfig, Thresholds};
use syllabus_progress::{TermSchedule, VelocityConfig};
use syllabus_storage::Storage;

/// Department settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentConfig {
    /// Users acting as head of department
    pub heads: Vec<FacultyId>,
}

/// Everything tunable, loaded from JSON. Missing fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Term calendar
    pub term: TermSchedule,
    /// Velocity classification
    pub velocity: VelocityConfig,
    /// Alert thresholds
    pub thresholds: Thresholds,
    /// Automated alert switches
    pub alerts: AlertConfig,
    /// Department roles
    pub department: DepartmentConfig,
}

impl SyncConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Whether `user` acts as head of department.
    pub fn is_head(&self, user: &FacultyId) -> bool {
        self.department.heads.contains(user)
    }

    /// Build the session for `--as`. Heads need no faculty record; anyone
    /// else must be a known faculty member.
    pub async fn session(&self, storage: &dyn Storage, user: Option<&str>) -> Result<Session> {
        let user = user.context("This command needs --as <user>")?;
        let id = FacultyId::new(user);
        let faculty = storage.load_faculty(&id).await?;

        if self.is_head(&id) {
            let name = faculty.map(|f| f.name).unwrap_or_else(|| user.to_string());
            return Ok(Session::head_of_department(id, name));
        }
        match faculty {
            Some(f) => Ok(Session::faculty(id, f.name)),
            None => bail!("Unknown user: {}", user),
        }
    }
}
