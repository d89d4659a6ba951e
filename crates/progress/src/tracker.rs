//! Progress tracking service.

use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use syllabus_core::{CompletionEvent, Subject, SubjectId, Time};
use syllabus_storage::Storage;
use tracing::debug;
use crate::aggregator::{ProgressAggregator, SubjectProgress};
use crate::error::{ProgressError, Result};
use crate::estimator::CompletionEstimator;
use crate::schedule::TermSchedule;
use crate::velocity::{classify, Velocity, VelocityConfig, WeeklyCompletions};

/// Progress tracking service.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Current status of one subject.
    async fn subject_status(&self, subject_id: &SubjectId, now: Time) -> Result<SubjectStatus>;

    /// Take a progress snapshot of every subject.
    async fn snapshot(&self, now: Time) -> Result<ProgressSnapshot>;
}

/// Everything known about a subject's pace at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStatus {
    /// Aggregated progress
    pub progress: SubjectProgress,

    /// Baseline expectation (0-100)
    pub expected: u8,

    /// Classification of progress against the baseline
    pub velocity: Velocity,

    /// Completions this week and last week
    pub weekly: WeeklyCompletions,

    /// Projected completion at the recent pace
    pub projected_completion: Option<Time>,

    /// Latest completion toggle
    pub last_update: Option<Time>,
}

impl SubjectStatus {
    /// Points the subject trails its baseline by (negative when ahead).
    pub fn delay(&self) -> i16 {
        self.expected as i16 - self.progress.percentage as i16
    }
}

/// A snapshot of progress at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// When snapshot was taken
    pub timestamp: Time,

    /// Subject statuses ordered by subject id
    pub subjects: Vec<SubjectStatus>,
}

/// Basic progress tracker implementation.
#[derive(Clone)]
pub struct BasicProgressTracker {
    storage: Arc<dyn Storage>,
    schedule: TermSchedule,
    velocity: VelocityConfig,
}

impl BasicProgressTracker {
    /// Create a new progress tracker.
    pub fn new(storage: Arc<dyn Storage>, schedule: TermSchedule, velocity: VelocityConfig) -> Self {
        Self {
            storage,
            schedule,
            velocity,
        }
    }

    /// Velocity settings in use.
    pub fn velocity_config(&self) -> &VelocityConfig {
        &self.velocity
    }

    /// Assess a subject against the completion log without touching storage.
    ///
    /// `events` may contain other subjects' events; they are ignored.
    pub fn assess(&self, subject: &Subject, events: &[CompletionEvent], now: Time) -> SubjectStatus {
        let own: Vec<CompletionEvent> = events
            .iter()
            .filter(|e| e.subject_id == subject.id && e.timestamp <= now)
            .cloned()
            .collect();

        let progress = ProgressAggregator::new(self.velocity.weighting).subject(subject);
        let expected = self
            .schedule
            .expected_progress(subject, self.velocity.weighting, now);
        let velocity = classify(
            progress.percentage as f64,
            expected as f64,
            self.velocity.tolerance,
        );

        SubjectStatus {
            expected,
            velocity,
            weekly: WeeklyCompletions::from_events(&own, now),
            projected_completion: CompletionEstimator::new(self.velocity.lookback_weeks)
                .estimate_subject(subject, &own, now),
            last_update: own.iter().map(|e| e.timestamp).max(),
            progress,
        }
    }
}

#[async_trait]
impl ProgressTracker for BasicProgressTracker {
    async fn subject_status(&self, subject_id: &SubjectId, now: Time) -> Result<SubjectStatus> {
        let subject = self
            .storage
            .load_subject(subject_id)
            .await?
            .ok_or_else(|| ProgressError::SubjectNotFound(subject_id.clone()))?;
        let events = self.storage.list_events(Some(subject_id)).await?;
        Ok(self.assess(&subject, &events, now))
    }

    async fn snapshot(&self, now: Time) -> Result<ProgressSnapshot> {
        let subjects = self.storage.list_subjects().await?;
        let events = self.storage.list_events(None).await?;
        debug!("Snapshot over {} subjects, {} events", subjects.len(), events.len());

        Ok(ProgressSnapshot {
            timestamp: now,
            subjects: subjects
                .iter()
                .map(|s| self.assess(s, &events, now))
                .collect(),
        })
    }
}
