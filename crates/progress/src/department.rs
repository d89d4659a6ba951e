//! Department overview, faculty comparison and reports.
//!
//! Progress figures derive from a [`ProgressSnapshot`]; subjects are
//! attributed to the faculty that owns them. The intervention report reads
//! alerts and plans as stored.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use syllabus_core::{
    Alert, AlertStatus, AlertType, CatchUpPlan, Faculty, FacultyId, PlanOrigin, PlanStatus,
    Severity, Time,
};
use syllabus_storage::{AlertFilter, PlanFilter, Storage};
use crate::error::{ProgressError, Result};
use crate::tracker::{ProgressSnapshot, ProgressTracker, SubjectStatus};
use crate::velocity::{classify, Trend, Velocity, WeeklyCompletions};

/// Department-wide statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepartmentStats {
    /// Faculty members
    pub total_faculty: usize,
    /// Subjects
    pub total_subjects: usize,
    /// Mean subject progress
    pub average_progress: u8,
    /// Subjects ahead of schedule
    pub ahead: usize,
    /// Subjects on track
    pub on_track: usize,
    /// Subjects behind schedule
    pub delayed: usize,
}

/// One faculty member in the department overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyRow {
    /// Faculty id
    pub faculty_id: FacultyId,
    /// Display name
    pub name: String,
    /// Owned subject names
    pub subjects: Vec<String>,
    /// Mean progress of owned subjects
    pub average_progress: u8,
    /// Mean expectation of owned subjects
    pub average_expected: u8,
    /// Classification of the two means
    pub status: Velocity,
    /// Latest completion toggle in any owned subject
    pub last_update: Option<Time>,
}

/// One faculty member in the performance comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyComparison {
    /// Faculty id
    pub faculty_id: FacultyId,
    /// Display name
    pub name: String,
    /// Owned subjects
    pub subjects: usize,
    /// Mean progress of owned subjects
    pub average_progress: u8,
    /// Topics completed across owned subjects
    pub topics_completed: usize,
    /// Topics across owned subjects
    pub total_topics: usize,
    /// Completions in the last seven days
    pub completed_last_week: usize,
    /// Week-over-week direction
    pub trend: Trend,
}

/// Head-of-department report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentReport {
    /// Generation time
    pub generated_at: Time,
    /// Department statistics
    pub stats: DepartmentStats,
    /// Faculty overview
    pub faculty: Vec<FacultyRow>,
    /// Faculty comparison
    pub comparison: Vec<FacultyComparison>,
}

/// Report for one faculty member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyReport {
    /// Generation time
    pub generated_at: Time,
    /// Overview row
    pub overview: FacultyRow,
    /// Comparison row
    pub comparison: FacultyComparison,
    /// Owned subjects in detail
    pub subjects: Vec<SubjectStatus>,
}

/// Alert counts by status, type and severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertCounts {
    /// All alerts
    pub total: usize,
    /// Awaiting action
    pub active: usize,
    /// Covered by a proposed plan
    pub pending: usize,
    /// Closed
    pub resolved: usize,
    /// Progress-delay alerts
    pub progress_delay: usize,
    /// Velocity-drop alerts
    pub velocity_drop: usize,
    /// Prerequisite-gap alerts
    pub prerequisite_gap: usize,
    /// High severity
    pub high: usize,
    /// Medium severity
    pub medium: usize,
    /// Low severity
    pub low: usize,
}

/// Plan counts by status and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanCounts {
    /// All plans
    pub total: usize,
    /// Awaiting a decision
    pub proposed: usize,
    /// Approved
    pub approved: usize,
    /// Rejected
    pub rejected: usize,
    /// Drafted by the rule engine
    pub suggested: usize,
    /// Written by hand
    pub manual: usize,
}

/// Head-of-department intervention report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionReport {
    /// Generation time
    pub generated_at: Time,
    /// Alert breakdown
    pub alerts: AlertCounts,
    /// Plan breakdown
    pub plans: PlanCounts,
    /// Active and pending alerts, oldest first
    pub open_alerts: Vec<Alert>,
    /// Plans awaiting a decision, oldest first
    pub proposed_plans: Vec<CatchUpPlan>,
}

/// Count alerts.
pub fn alert_counts(alerts: &[Alert]) -> AlertCounts {
    let mut counts = AlertCounts {
        total: alerts.len(),
        ..Default::default()
    };
    for alert in alerts {
        match alert.status {
            AlertStatus::Active => counts.active += 1,
            AlertStatus::Pending => counts.pending += 1,
            AlertStatus::Resolved => counts.resolved += 1,
        }
        match alert.alert_type {
            AlertType::ProgressDelay => counts.progress_delay += 1,
            AlertType::VelocityDrop => counts.velocity_drop += 1,
            AlertType::PrerequisiteGap => counts.prerequisite_gap += 1,
        }
        match alert.severity {
            Severity::High => counts.high += 1,
            Severity::Medium => counts.medium += 1,
            Severity::Low => counts.low += 1,
        }
    }
    counts
}

/// Count plans.
pub fn plan_counts(plans: &[CatchUpPlan]) -> PlanCounts {
    let mut counts = PlanCounts {
        total: plans.len(),
        ..Default::default()
    };
    for plan in plans {
        match plan.status {
            PlanStatus::Proposed => counts.proposed += 1,
            PlanStatus::Approved => counts.approved += 1,
            PlanStatus::Rejected => counts.rejected += 1,
        }
        match plan.origin {
            PlanOrigin::Suggested => counts.suggested += 1,
            PlanOrigin::Manual => counts.manual += 1,
        }
    }
    counts
}

/// Compute department statistics.
pub fn department_stats(faculty: &[Faculty], snapshot: &ProgressSnapshot) -> DepartmentStats {
    let count = |v: Velocity| snapshot.subjects.iter().filter(|s| s.velocity == v).count();
    DepartmentStats {
        total_faculty: faculty.len(),
        total_subjects: snapshot.subjects.len(),
        average_progress: mean(snapshot.subjects.iter().map(|s| s.progress.percentage)),
        ahead: count(Velocity::Ahead),
        on_track: count(Velocity::OnTrack),
        delayed: count(Velocity::Delayed),
    }
}

/// Overview row for one faculty member.
pub fn faculty_row(faculty: &Faculty, snapshot: &ProgressSnapshot, tolerance: f64) -> FacultyRow {
    let owned: Vec<&SubjectStatus> = owned_by(&faculty.id, snapshot).collect();
    let average_progress = mean(owned.iter().map(|s| s.progress.percentage));
    let average_expected = mean(owned.iter().map(|s| s.expected));

    FacultyRow {
        faculty_id: faculty.id.clone(),
        name: faculty.name.clone(),
        subjects: owned.iter().map(|s| s.progress.name.clone()).collect(),
        average_progress,
        average_expected,
        status: classify(average_progress as f64, average_expected as f64, tolerance),
        last_update: owned.iter().filter_map(|s| s.last_update).max(),
    }
}

/// Comparison row for one faculty member.
pub fn faculty_comparison(faculty: &Faculty, snapshot: &ProgressSnapshot) -> FacultyComparison {
    let owned: Vec<&SubjectStatus> = owned_by(&faculty.id, snapshot).collect();
    let weekly = owned.iter().fold(WeeklyCompletions::default(), |acc, s| WeeklyCompletions {
        this_week: acc.this_week + s.weekly.this_week,
        last_week: acc.last_week + s.weekly.last_week,
    });

    FacultyComparison {
        faculty_id: faculty.id.clone(),
        name: faculty.name.clone(),
        subjects: owned.len(),
        average_progress: mean(owned.iter().map(|s| s.progress.percentage)),
        topics_completed: owned.iter().map(|s| s.progress.completed_topics).sum(),
        total_topics: owned.iter().map(|s| s.progress.total_topics).sum(),
        completed_last_week: weekly.this_week,
        trend: weekly.trend(),
    }
}

fn owned_by<'a>(
    faculty: &'a FacultyId,
    snapshot: &'a ProgressSnapshot,
) -> impl Iterator<Item = &'a SubjectStatus> {
    snapshot
        .subjects
        .iter()
        .filter(move |s| &s.progress.faculty == faculty)
}

fn mean(values: impl Iterator<Item = u8>) -> u8 {
    let (sum, n) = values.fold((0u64, 0u64), |(sum, n), v| (sum + v as u64, n + 1));
    if n == 0 {
        return 0;
    }
    (sum as f64 / n as f64).round() as u8
}

/// Builds reports from storage through a tracker.
pub struct ReportBuilder<T: ProgressTracker> {
    storage: Arc<dyn Storage>,
    tracker: T,
    tolerance: f64,
}

impl<T: ProgressTracker> ReportBuilder<T> {
    /// Create a report builder.
    pub fn new(storage: Arc<dyn Storage>, tracker: T, tolerance: f64) -> Self {
        Self {
            storage,
            tracker,
            tolerance,
        }
    }

    /// Department-wide report.
    pub async fn department(&self, now: Time) -> Result<DepartmentReport> {
        let faculty = self.storage.list_faculty().await?;
        let snapshot = self.tracker.snapshot(now).await?;

        Ok(DepartmentReport {
            generated_at: now,
            stats: department_stats(&faculty, &snapshot),
            faculty: faculty
                .iter()
                .map(|f| faculty_row(f, &snapshot, self.tolerance))
                .collect(),
            comparison: faculty
                .iter()
                .map(|f| faculty_comparison(f, &snapshot))
                .collect(),
        })
    }

    /// Report for one faculty member.
    pub async fn faculty(&self, faculty_id: &FacultyId, now: Time) -> Result<FacultyReport> {
        let faculty = self
            .storage
            .load_faculty(faculty_id)
            .await?
            .ok_or_else(|| ProgressError::FacultyNotFound(faculty_id.clone()))?;
        let snapshot = self.tracker.snapshot(now).await?;

        Ok(FacultyReport {
            generated_at: now,
            overview: faculty_row(&faculty, &snapshot, self.tolerance),
            comparison: faculty_comparison(&faculty, &snapshot),
            subjects: owned_by(faculty_id, &snapshot).cloned().collect(),
        })
    }

    /// Alerts and catch-up plans across the department.
    pub async fn intervention(&self, now: Time) -> Result<InterventionReport> {
        let alerts = self.storage.list_alerts(&AlertFilter::default()).await?;
        let plans = self.storage.list_plans(&PlanFilter::default()).await?;

        Ok(InterventionReport {
            generated_at: now,
            alerts: alert_counts(&alerts),
            plans: plan_counts(&plans),
            open_alerts: alerts.into_iter().filter(Alert::is_open).collect(),
            proposed_plans: plans
                .into_iter()
                .filter(|p| p.status == PlanStatus::Proposed)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use syllabus_core::{CompletionEvent, PlannedDuration, Subject, Topic, Unit};
    use syllabus_storage::MemoryStorage;
    use crate::schedule::TermSchedule;
    use crate::tracker::BasicProgressTracker;
    use crate::velocity::VelocityConfig;

    fn schedule() -> TermSchedule {
        TermSchedule::new(NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(), 10)
    }

    fn subject(id: &str, name: &str, faculty: &str, completed: usize) -> Subject {
        let mut unit = Unit::new(format!("{}-u1", id), "Unit", PlannedDuration::weeks(4));
        for i in 0..10 {
            let mut t = Topic::new(format!("{}-t{}", id, i), format!("Topic {}", i));
            t.completed = i < completed;
            unit.topics.push(t);
        }
        Subject::new(id, id.to_uppercase(), name, faculty).with_unit(unit)
    }

    async fn builder() -> (ReportBuilder<BasicProgressTracker>, Time) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage
            .save_faculty(&Faculty::new("f1", "Dr. Sarah Johnson", "CSE").with_subject("cs301").with_subject("cs303"))
            .await
            .unwrap();
        storage
            .save_faculty(&Faculty::new("f3", "Dr. Emily Rodriguez", "CSE").with_subject("cs304"))
            .await
            .unwrap();
        storage.save_subject(&subject("cs301", "Data Structures", "f1", 9)).await.unwrap();
        storage.save_subject(&subject("cs303", "Algorithms", "f1", 7)).await.unwrap();
        storage.save_subject(&subject("cs304", "Computer Networks", "f3", 2)).await.unwrap();

        // Two weeks into four-week units: expected 50.
        let now = schedule().start_time() + Duration::weeks(2);
        for days_ago in [1, 2, 3, 9] {
            storage
                .append_event(&CompletionEvent::new(
                    "cs301".into(),
                    format!("cs301-t{}", days_ago).into(),
                    "f1".into(),
                    true,
                    now - Duration::days(days_ago),
                ))
                .await
                .unwrap();
        }
        storage
            .append_event(&CompletionEvent::new(
                "cs304".into(),
                "cs304-t0".into(),
                "f3".into(),
                true,
                now - Duration::days(10),
            ))
            .await
            .unwrap();

        let tracker = BasicProgressTracker::new(storage.clone(), schedule(), VelocityConfig::default());
        (ReportBuilder::new(storage, tracker, 10.0), now)
    }

    #[tokio::test]
    async fn test_department_report() {
        let (builder, now) = builder().await;
        let report = builder.department(now).await.unwrap();

        assert_eq!(
            report.stats,
            DepartmentStats {
                total_faculty: 2,
                total_subjects: 3,
                average_progress: 60,
                ahead: 2,
                on_track: 0,
                delayed: 1,
            }
        );

        let sarah = &report.faculty[0];
        assert_eq!(sarah.subjects, vec!["Data Structures", "Algorithms"]);
        assert_eq!(sarah.average_progress, 80);
        assert_eq!(sarah.status, Velocity::Ahead);
        assert_eq!(sarah.last_update, Some(now - Duration::days(1)));

        let emily = &report.faculty[1];
        assert_eq!(emily.status, Velocity::Delayed);
    }

    #[tokio::test]
    async fn test_faculty_comparison() {
        let (builder, now) = builder().await;
        let report = builder.department(now).await.unwrap();

        let sarah = &report.comparison[0];
        assert_eq!(sarah.topics_completed, 16);
        assert_eq!(sarah.total_topics, 20);
        assert_eq!(sarah.completed_last_week, 3);
        assert_eq!(sarah.trend, Trend::Up);

        let emily = &report.comparison[1];
        assert_eq!(emily.completed_last_week, 0);
        assert_eq!(emily.trend, Trend::Down);
    }

    #[tokio::test]
    async fn test_faculty_report() {
        let (builder, now) = builder().await;
        let report = builder.faculty(&"f3".into(), now).await.unwrap();
        assert_eq!(report.subjects.len(), 1);
        assert_eq!(report.overview.average_progress, 20);

        let err = builder.faculty(&"f9".into(), now).await.unwrap_err();
        assert!(matches!(err, ProgressError::FacultyNotFound(_)));
    }

    #[tokio::test]
    async fn test_intervention_report() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let now = schedule().start_time() + Duration::weeks(2);

        let delay = Alert::new(AlertType::ProgressDelay, Severity::High, "cs304".into(), "f3".into(), "behind", now);
        let mut slowing = Alert::new(AlertType::VelocityDrop, Severity::Medium, "cs304".into(), "f3".into(), "slower", now);
        slowing.mark_pending(now).unwrap();
        let mut gap = Alert::new(AlertType::PrerequisiteGap, Severity::Medium, "cs301".into(), "f1".into(), "gap", now);
        gap.resolve(now).unwrap();
        for alert in [&delay, &slowing, &gap] {
            storage.save_alert(alert).await.unwrap();
        }

        let proposed = CatchUpPlan::propose("cs304".into(), "f3".into(), "Extra sessions", 14, PlanOrigin::Suggested, now)
            .addressing(slowing.id);
        let mut approved = CatchUpPlan::propose("cs301".into(), "f1".into(), "Refresher", 7, PlanOrigin::Manual, now)
            .addressing(gap.id);
        approved.approve("hod".into(), now).unwrap();
        storage.save_plan(&proposed).await.unwrap();
        storage.save_plan(&approved).await.unwrap();

        let tracker = BasicProgressTracker::new(storage.clone(), schedule(), VelocityConfig::default());
        let report = ReportBuilder::new(storage, tracker, 10.0).intervention(now).await.unwrap();

        assert_eq!(
            report.alerts,
            AlertCounts {
                total: 3,
                active: 1,
                pending: 1,
                resolved: 1,
                progress_delay: 1,
                velocity_drop: 1,
                prerequisite_gap: 1,
                high: 1,
                medium: 2,
                low: 0,
            }
        );
        assert_eq!(
            report.plans,
            PlanCounts {
                total: 2,
                proposed: 1,
                approved: 1,
                rejected: 0,
                suggested: 1,
                manual: 1,
            }
        );
        assert_eq!(report.open_alerts.len(), 2);
        assert!(report.open_alerts.iter().all(|a| a.subject_id.as_str() == "cs304"));
        assert_eq!(report.proposed_plans.len(), 1);
        assert_eq!(report.proposed_plans[0].id, proposed.id);
    }

    #[test]
    fn test_empty_department() {
        let snapshot = ProgressSnapshot {
            timestamp: chrono::Utc::now(),
            subjects: Vec::new(),
        };
        assert_eq!(department_stats(&[], &snapshot), DepartmentStats::default());
    }
}
