//! Syllabus import from a JSON file.

use std::path::Path;
use anyhow::{Context, Result};
use serde::Deserialize;
use syllabus_core::{Faculty, Subject};
use syllabus_progress::PrerequisiteAnalyzer;
use syllabus_storage::Storage;
use tracing::{info, warn};

/// Shape of an import file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImportFile {
    /// Faculty records
    pub faculty: Vec<Faculty>,
    /// Subject trees
    pub subjects: Vec<Subject>,
}

/// Counts of imported records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Faculty saved
    pub faculty: usize,
    /// Subjects saved
    pub subjects: usize,
    /// Warnings raised while checking the syllabus
    pub warnings: usize,
}

/// Read `path` and save everything it contains, replacing records with the
/// same ids.
pub async fn import_file(storage: &dyn Storage, path: &Path) -> Result<ImportSummary> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: ImportFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid import file {}", path.display()))?;
    import(storage, file).await
}

/// Save an already parsed import.
pub async fn import(storage: &dyn Storage, file: ImportFile) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    let mut known = storage.list_faculty().await?;
    for faculty in &file.faculty {
        storage.save_faculty(faculty).await?;
        known.retain(|f| f.id != faculty.id);
        known.push(faculty.clone());
        summary.faculty += 1;
    }

    let analyzer = PrerequisiteAnalyzer::new();
    for subject in &file.subjects {
        if !known.iter().any(|f| f.id == subject.faculty) {
            warn!("Subject {} is owned by unknown faculty {}", subject.id, subject.faculty);
            summary.warnings += 1;
        }

        let analysis = analyzer.analyze(subject);
        for (topic, missing) in &analysis.invalid_references {
            warn!("{}: topic {} names unknown prerequisite {}", subject.id, topic, missing);
        }
        for cycle in &analysis.cycles {
            let path: Vec<&str> = cycle.iter().map(|t| t.as_str()).collect();
            warn!("{}: circular prerequisites {}", subject.id, path.join(" -> "));
        }
        summary.warnings += analysis.invalid_references.len() + analysis.cycles.len();

        storage.save_subject(subject).await?;
        summary.subjects += 1;
    }

    info!(
        "Imported {} faculty and {} subjects ({} warnings)",
        summary.faculty, summary.subjects, summary.warnings
    );
    Ok(summary)
}
