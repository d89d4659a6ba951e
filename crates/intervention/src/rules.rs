//! Intervention rules.
//!
//! Rules are pure: they look at one subject and its assessed status and
//! return findings. Persisting findings as alerts is the engine's job.

use serde::{Deserialize, Serialize};
use syllabus_core::{Alert, AlertType, FacultyId, Severity, Subject, SubjectId, Time};
use syllabus_progress::{PrerequisiteAnalyzer, PrerequisiteGap, SubjectStatus};
use crate::config::Thresholds;

/// A rule that fired for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Alert type to raise
    pub alert_type: AlertType,
    /// Severity
    pub severity: Severity,
    /// Subject concerned
    pub subject_id: SubjectId,
    /// Owning faculty
    pub faculty_id: FacultyId,
    /// Human readable description
    pub description: String,
}

impl Finding {
    /// Deduplication key, matching [`Alert::key`].
    pub fn key(&self) -> (AlertType, &SubjectId) {
        (self.alert_type, &self.subject_id)
    }

    /// Turn the finding into a new active alert.
    pub fn into_alert(self, now: Time) -> Alert {
        Alert::new(
            self.alert_type,
            self.severity,
            self.subject_id,
            self.faculty_id,
            self.description,
            now,
        )
    }
}

/// Evaluates every rule against a subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine {
    thresholds: Thresholds,
}

impl RuleEngine {
    /// Create a rule engine.
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Run all rules. At most one finding per alert type.
    pub fn evaluate(&self, subject: &Subject, status: &SubjectStatus, now: Time) -> Vec<Finding> {
        [
            self.progress_delay(status),
            self.velocity_drop(status),
            self.prerequisite_gap(subject, now),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Fires when progress trails the baseline by more than the threshold.
    pub fn progress_delay(&self, status: &SubjectStatus) -> Option<Finding> {
        let delay = status.delay() as f64;
        if delay <= self.thresholds.progress_delay {
            return None;
        }
        Some(Finding {
            alert_type: AlertType::ProgressDelay,
            severity: self.thresholds.severity(delay, self.thresholds.progress_delay),
            subject_id: status.progress.subject_id.clone(),
            faculty_id: status.progress.faculty.clone(),
            description: format!(
                "Subject is {}% behind schedule (expected {}%, actual {}%)",
                delay, status.expected, status.progress.percentage
            ),
        })
    }

    /// Fires when this week's completions fell by more than the threshold.
    /// Silent when last week had no completions.
    pub fn velocity_drop(&self, status: &SubjectStatus) -> Option<Finding> {
        let drop = status.weekly.drop_percent()?;
        if drop <= self.thresholds.velocity_drop {
            return None;
        }
        Some(Finding {
            alert_type: AlertType::VelocityDrop,
            severity: self.thresholds.severity(drop, self.thresholds.velocity_drop),
            subject_id: status.progress.subject_id.clone(),
            faculty_id: status.progress.faculty.clone(),
            description: format!(
                "Teaching velocity dropped by {:.0}% ({} topics this week, {} last week)",
                drop, status.weekly.this_week, status.weekly.last_week
            ),
        })
    }

    /// Fires when a completed topic's prerequisite is still incomplete and the
    /// gap has outlasted the grace period.
    pub fn prerequisite_gap(&self, subject: &Subject, now: Time) -> Option<Finding> {
        let gaps: Vec<PrerequisiteGap> = PrerequisiteAnalyzer::new()
            .detect_gaps(subject)
            .into_iter()
            .filter(|g| g.persisted(self.thresholds.prerequisite_gap_days, now))
            .collect();

        let description = match gaps.as_slice() {
            [] => return None,
            [gap] => format!(
                "{} completed before its prerequisite {}",
                gap.topic_name, gap.prerequisite_name
            ),
            many => format!(
                "{} topics completed before their prerequisites: {}",
                many.len(),
                many.iter()
                    .map(|g| format!("{} (needs {})", g.topic_name, g.prerequisite_name))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };

        Some(Finding {
            alert_type: AlertType::PrerequisiteGap,
            severity: Severity::Medium,
            subject_id: subject.id.clone(),
            faculty_id: subject.faculty.clone(),
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use syllabus_core::{PlannedDuration, Topic, Unit};
    use syllabus_progress::{ProgressAggregator, Velocity, WeeklyCompletions};

    fn cs301() -> Subject {
        Subject::new("cs301", "CS301", "Data Structures & Algorithms", "f1").with_unit(
            Unit::new("unit2", "Stacks and Queues", PlannedDuration::weeks(2))
                .with_topic(Topic::new("t7", "Stack Applications").completed())
                .with_topic(Topic::new("t8", "Queue Implementation").with_prerequisite("t7").completed())
                .with_topic(Topic::new("t9", "Circular Queue").with_prerequisite("t8"))
                .with_topic(Topic::new("t10", "Priority Queue").with_prerequisite("t9")),
        )
    }

    fn status(subject: &Subject, expected: u8, weekly: WeeklyCompletions) -> SubjectStatus {
        SubjectStatus {
            progress: ProgressAggregator::default().subject(subject),
            expected,
            velocity: Velocity::OnTrack,
            weekly,
            projected_completion: None,
            last_update: None,
        }
    }

    #[test]
    fn test_progress_delay_fires_beyond_threshold() {
        let s = cs301(); // 50%
        let engine = RuleEngine::default();

        assert!(engine.progress_delay(&status(&s, 60, WeeklyCompletions::default())).is_none());

        let finding = engine
            .progress_delay(&status(&s, 65, WeeklyCompletions::default()))
            .unwrap();
        assert_eq!(finding.alert_type, AlertType::ProgressDelay);
        assert_eq!(finding.severity, Severity::High);
        assert!(finding.description.starts_with("Subject is 15% behind schedule"));
    }

    #[test]
    fn test_velocity_drop() {
        let s = cs301();
        let engine = RuleEngine::default();

        let finding = engine
            .velocity_drop(&status(&s, 50, WeeklyCompletions { this_week: 3, last_week: 4 }))
            .unwrap();
        assert_eq!(finding.severity, Severity::High);
        assert!(finding.description.starts_with("Teaching velocity dropped by 25%"));

        // Exactly 20% is not more than the threshold.
        assert!(engine
            .velocity_drop(&status(&s, 50, WeeklyCompletions { this_week: 4, last_week: 5 }))
            .is_none());
        // No baseline week.
        assert!(engine
            .velocity_drop(&status(&s, 50, WeeklyCompletions { this_week: 0, last_week: 0 }))
            .is_none());
    }

    #[test]
    fn test_circular_queue_open_after_complete_prerequisite_is_not_a_gap() {
        let s = cs301();
        let engine = RuleEngine::default();
        assert!(engine.prerequisite_gap(&s, Utc::now()).is_none());
        assert!(engine
            .evaluate(&s, &status(&s, 50, WeeklyCompletions::default()), Utc::now())
            .is_empty());
    }

    #[test]
    fn test_gap_respects_grace_period() {
        let now = Utc::now();
        let mut s = cs301();
        let topic = s.topic_mut(&"t10".into()).unwrap();
        topic.completed = true;
        topic.completed_at = Some(now - Duration::hours(2));

        let engine = RuleEngine::default();
        assert!(engine.prerequisite_gap(&s, now).is_none());

        let finding = engine.prerequisite_gap(&s, now + Duration::days(1)).unwrap();
        assert_eq!(finding.severity, Severity::Medium);
        assert_eq!(finding.description, "Priority Queue completed before its prerequisite Circular Queue");
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let mut s = cs301();
        s.topic_mut(&"t10".into()).unwrap().completed = true;
        let st = status(&s, 90, WeeklyCompletions { this_week: 1, last_week: 4 });
        let engine = RuleEngine::default();
        let now = Utc::now();

        let first = engine.evaluate(&s, &st, now);
        assert_eq!(first.len(), 3);
        assert_eq!(first, engine.evaluate(&s, &st, now));
    }
}
