//! Catch-up plan suggestions.

use syllabus_core::{Alert, AlertType, CatchUpPlan, CompletionEvent, PlanOrigin, Subject, Time};
use syllabus_progress::{CompletionEstimator, PrerequisiteAnalyzer, SubjectStatus};

/// Shortest recovery estimate, in days.
pub const MIN_RECOVERY_DAYS: u32 = 7;

/// Drafts catch-up plans for alerts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatchUpAdvisor {
    estimator: CompletionEstimator,
}

impl CatchUpAdvisor {
    /// Create an advisor measuring pace over the trailing `lookback_weeks`.
    pub fn new(lookback_weeks: u32) -> Self {
        Self {
            estimator: CompletionEstimator::new(lookback_weeks),
        }
    }

    /// Draft a suggested plan addressing `alert`.
    ///
    /// `events` must be the subject's own completion log.
    pub fn draft(
        &self,
        alert: &Alert,
        subject: &Subject,
        status: &SubjectStatus,
        events: &[CompletionEvent],
        now: Time,
    ) -> CatchUpPlan {
        let (description, days) = match alert.alert_type {
            AlertType::ProgressDelay => {
                let behind = topics_behind(status);
                (
                    format!(
                        "Schedule additional classes, focus on high-priority topics, \
                         combine related concepts to recover {} topic{}",
                        behind,
                        plural(behind)
                    ),
                    self.recovery_days(behind, subject, events, now),
                )
            }
            AlertType::VelocityDrop => {
                let shortfall = status
                    .weekly
                    .last_week
                    .saturating_sub(status.weekly.this_week)
                    .max(1);
                (
                    format!(
                        "Restore the weekly pace of {} topic{}: schedule additional classes, \
                         focus on high-priority topics",
                        status.weekly.last_week,
                        plural(status.weekly.last_week)
                    ),
                    self.recovery_days(shortfall, subject, events, now),
                )
            }
            AlertType::PrerequisiteGap => {
                let mut missing: Vec<String> = Vec::new();
                for gap in PrerequisiteAnalyzer::new().detect_gaps(subject) {
                    if !missing.contains(&gap.prerequisite_name) {
                        missing.push(gap.prerequisite_name);
                    }
                }
                let description = if missing.is_empty() {
                    "Refresher session on missing prerequisites, practical exercises focus".to_string()
                } else {
                    format!(
                        "Refresher session on {}, practical exercises focus",
                        missing.join(", ")
                    )
                };
                (description, MIN_RECOVERY_DAYS)
            }
        };

        CatchUpPlan::propose(
            alert.subject_id.clone(),
            alert.faculty_id.clone(),
            description,
            days,
            PlanOrigin::Suggested,
            now,
        )
        .addressing(alert.id)
    }

    /// Days to cover `topics` at the recent pace, falling back to the planned
    /// pace of the subject. Never below [`MIN_RECOVERY_DAYS`].
    fn recovery_days(
        &self,
        topics: usize,
        subject: &Subject,
        events: &[CompletionEvent],
        now: Time,
    ) -> u32 {
        self.estimator
            .days_for(topics, events, now)
            .or_else(|| planned_days(subject, topics))
            .unwrap_or(MIN_RECOVERY_DAYS)
            .max(MIN_RECOVERY_DAYS)
    }
}

/// Topics needed to close the gap to the baseline, at least one.
fn topics_behind(status: &SubjectStatus) -> usize {
    let delay = status.delay().max(0) as f64;
    let topics = (delay * status.progress.total_topics as f64 / 100.0).ceil() as usize;
    topics.max(1)
}

fn planned_days(subject: &Subject, topics: usize) -> Option<u32> {
    let total = subject.total_topics();
    let planned = subject.planned_duration().as_days();
    if total == 0 || planned == 0 {
        return None;
    }
    Some((topics as f64 * planned as f64 / total as f64).ceil() as u32)
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use syllabus_core::{PlanStatus, PlannedDuration, Severity, Topic, Unit};
    use syllabus_progress::{ProgressAggregator, Velocity, WeeklyCompletions};

    fn subject() -> Subject {
        let mut unit = Unit::new("u1", "Transport Layer", PlannedDuration::weeks(4));
        for i in 0..20 {
            let mut t = Topic::new(format!("t{}", i), format!("Topic {}", i));
            t.completed = i < 8;
            unit.topics.push(t);
        }
        Subject::new("cs304", "CS304", "Computer Networks", "f3").with_unit(unit)
    }

    fn status(subject: &Subject, expected: u8) -> SubjectStatus {
        SubjectStatus {
            progress: ProgressAggregator::default().subject(subject),
            expected,
            velocity: Velocity::Delayed,
            weekly: WeeklyCompletions { this_week: 1, last_week: 4 },
            projected_completion: None,
            last_update: None,
        }
    }

    fn alert(alert_type: AlertType) -> Alert {
        Alert::new(alert_type, Severity::High, "cs304".into(), "f3".into(), "behind", Utc::now())
    }

    fn events(now: Time, count: usize) -> Vec<CompletionEvent> {
        (0..count)
            .map(|i| {
                CompletionEvent::new("cs304".into(), format!("t{}", i).into(), "f3".into(), true, now - Duration::days(i as i64 + 1))
            })
            .collect()
    }

    #[test]
    fn test_progress_delay_plan_uses_recent_pace() {
        let now = Utc::now();
        let s = subject(); // 40%
        let a = alert(AlertType::ProgressDelay);
        // 15 points of 20 topics = 3 topics; 8 completions in 4 weeks = 2/week.
        let plan = CatchUpAdvisor::default().draft(&a, &s, &status(&s, 55), &events(now, 8), now);

        assert_eq!(plan.status, PlanStatus::Proposed);
        assert_eq!(plan.origin, PlanOrigin::Suggested);
        assert_eq!(plan.addresses, vec![a.id]);
        assert!(plan.description.contains("recover 3 topics"));
        assert_eq!(plan.estimated_recovery_days, 11);
    }

    #[test]
    fn test_recovery_falls_back_to_planned_pace_and_minimum() {
        let now = Utc::now();
        let s = subject();
        let a = alert(AlertType::ProgressDelay);
        // No recent pace: 20 topics over 28 days, 3 topics -> 5 days -> one week.
        let plan = CatchUpAdvisor::default().draft(&a, &s, &status(&s, 55), &[], now);
        assert_eq!(plan.estimated_recovery_days, MIN_RECOVERY_DAYS);
    }

    #[test]
    fn test_prerequisite_refresher() {
        let now = Utc::now();
        let s = Subject::new("cs302", "CS302", "Database Systems", "f2").with_unit(
            Unit::new("u1", "SQL", PlannedDuration::weeks(2))
                .with_topic(Topic::new("t1", "SQL Basics"))
                .with_topic(Topic::new("t2", "Joins").with_prerequisite("t1").completed()),
        );
        let a = alert(AlertType::PrerequisiteGap);
        let plan = CatchUpAdvisor::default().draft(&a, &s, &status(&s, 50), &[], now);
        assert_eq!(plan.description, "Refresher session on SQL Basics, practical exercises focus");
        assert_eq!(plan.estimated_recovery_days, 7);
    }

    #[test]
    fn test_velocity_drop_plan() {
        let now = Utc::now();
        let s = subject();
        let a = alert(AlertType::VelocityDrop);
        let plan = CatchUpAdvisor::default().draft(&a, &s, &status(&s, 40), &events(now, 8), now);
        // Shortfall of 3 topics at 2/week.
        assert!(plan.description.starts_with("Restore the weekly pace of 4 topics"));
        assert_eq!(plan.estimated_recovery_days, 11);
    }
}
