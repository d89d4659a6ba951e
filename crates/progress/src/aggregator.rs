//! Progress aggregation: topics roll up to units, units roll up to subjects.
//!
//! Everything here is a pure function of the subject tree, so running it
//! twice on unchanged data gives identical output.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use syllabus_core::{FacultyId, Subject, SubjectId, TopicId, Unit, UnitId, UnitStatus};

/// How unit percentages are combined into the subject percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Every unit counts the same
    #[default]
    Equal,
    /// Units count by planned duration
    Duration,
}

/// A problem found in one unit. The unit still gets a progress value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum UnitIssue {
    /// The unit has no topics; progress is reported as 0
    EmptyUnit,
    /// A topic names a prerequisite that is not in the subject
    InvalidPrerequisiteReference {
        /// Topic carrying the reference
        topic: TopicId,
        /// Referenced identifier that does not exist
        missing: TopicId,
    },
}

/// Progress of one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitProgress {
    /// Unit identifier
    pub unit_id: UnitId,
    /// Unit name
    pub name: String,
    /// Completed topics
    pub completed_topics: usize,
    /// Total topics
    pub total_topics: usize,
    /// Rounded percentage (0-100)
    pub percentage: u8,
    /// Derived status
    pub status: UnitStatus,
    /// Problems isolated to this unit
    pub issues: Vec<UnitIssue>,
}

/// Progress of a subject and its units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProgress {
    /// Subject identifier
    pub subject_id: SubjectId,
    /// Course code
    pub code: String,
    /// Subject name
    pub name: String,
    /// Owning faculty
    pub faculty: FacultyId,
    /// Rounded overall percentage (0-100)
    pub percentage: u8,
    /// Completed topics across all units
    pub completed_topics: usize,
    /// Total topics across all units
    pub total_topics: usize,
    /// Per-unit breakdown in syllabus order
    pub units: Vec<UnitProgress>,
}

impl SubjectProgress {
    /// Every issue in the subject, tagged with its unit.
    pub fn issues(&self) -> impl Iterator<Item = (&UnitId, &UnitIssue)> {
        self.units
            .iter()
            .flat_map(|u| u.issues.iter().map(move |i| (&u.unit_id, i)))
    }
}

/// Rolls topic completion up to unit and subject percentages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressAggregator {
    weighting: Weighting,
}

impl ProgressAggregator {
    /// Create an aggregator with the given weighting.
    pub fn new(weighting: Weighting) -> Self {
        Self { weighting }
    }

    /// Weighting in use.
    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Compute progress for a whole subject tree.
    pub fn subject(&self, subject: &Subject) -> SubjectProgress {
        let known: HashSet<&TopicId> = subject.topics().map(|t| &t.id).collect();
        let units: Vec<UnitProgress> = subject
            .units
            .iter()
            .map(|u| unit_progress(u, &known))
            .collect();

        let weights: Vec<u32> = subject.units.iter().map(|u| u.duration.as_days()).collect();
        let percentages: Vec<u8> = units.iter().map(|u| u.percentage).collect();
        let percentage = combine(&percentages, &weights, self.weighting);

        SubjectProgress {
            subject_id: subject.id.clone(),
            code: subject.code.clone(),
            name: subject.name.clone(),
            faculty: subject.faculty.clone(),
            percentage,
            completed_topics: units.iter().map(|u| u.completed_topics).sum(),
            total_topics: units.iter().map(|u| u.total_topics).sum(),
            units,
        }
    }
}

/// Progress of one unit; prerequisites are checked against `known` topic ids.
fn unit_progress(unit: &Unit, known: &HashSet<&TopicId>) -> UnitProgress {
    let total = unit.topics.len();
    let completed = unit.completed_topics();
    let mut issues = Vec::new();

    if total == 0 {
        issues.push(UnitIssue::EmptyUnit);
    }
    for topic in &unit.topics {
        if let Some(prerequisite) = &topic.prerequisite {
            if !known.contains(prerequisite) {
                issues.push(UnitIssue::InvalidPrerequisiteReference {
                    topic: topic.id.clone(),
                    missing: prerequisite.clone(),
                });
            }
        }
    }

    let percentage = percent(completed, total);
    UnitProgress {
        unit_id: unit.id.clone(),
        name: unit.name.clone(),
        completed_topics: completed,
        total_topics: total,
        percentage,
        status: UnitStatus::from_percentage(percentage),
        issues,
    }
}

/// `part / whole * 100`, rounded; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let ratio = (part.min(whole) as f64 / whole as f64) * 100.0;
    ratio.round() as u8
}

/// Combine unit percentages. Duration weighting falls back to equal weights
/// when no unit carries a duration.
pub(crate) fn combine(percentages: &[u8], weights: &[u32], weighting: Weighting) -> u8 {
    if percentages.is_empty() {
        return 0;
    }
    let total_weight: u64 = weights.iter().map(|&w| w as u64).sum();
    let value = match weighting {
        Weighting::Duration if total_weight > 0 => {
            let weighted: u64 = percentages
                .iter()
                .zip(weights)
                .map(|(&p, &w)| p as u64 * w as u64)
                .sum();
            weighted as f64 / total_weight as f64
        }
        _ => {
            let sum: u64 = percentages.iter().map(|&p| p as u64).sum();
            sum as f64 / percentages.len() as f64
        }
    };
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use syllabus_core::{PlannedDuration, Topic};

    fn unit(id: &str, weeks: u32, total: usize, completed: usize) -> Unit {
        let mut u = Unit::new(id, id, PlannedDuration::weeks(weeks));
        for i in 0..total {
            let mut t = Topic::new(format!("{}-t{}", id, i), format!("Topic {}", i));
            t.completed = i < completed;
            u.topics.push(t);
        }
        u
    }

    #[test]
    fn test_unit_three_of_five_is_sixty() {
        let s = Subject::new("cs301", "CS301", "DSA", "f1").with_unit(unit("u1", 2, 5, 3));
        let p = ProgressAggregator::default().subject(&s);
        assert_eq!(p.units[0].percentage, 60);
        assert_eq!(p.units[0].status, UnitStatus::InProgress);
    }

    #[test]
    fn test_subject_is_equal_weight_mean() {
        let s = Subject::new("cs301", "CS301", "DSA", "f1")
            .with_unit(unit("u1", 2, 5, 3))
            .with_unit(unit("u2", 4, 5, 0));
        let p = ProgressAggregator::default().subject(&s);
        assert_eq!(p.percentage, 30);
        assert_eq!(p.completed_topics, 3);
        assert_eq!(p.total_topics, 10);
    }

    #[test]
    fn test_duration_weighting() {
        let s = Subject::new("cs301", "CS301", "DSA", "f1")
            .with_unit(unit("u1", 1, 5, 5))
            .with_unit(unit("u2", 3, 5, 0));
        let p = ProgressAggregator::new(Weighting::Duration).subject(&s);
        assert_eq!(p.percentage, 25);
    }

    #[test]
    fn test_duration_weighting_without_durations_is_equal() {
        assert_eq!(combine(&[100, 0], &[0, 0], Weighting::Duration), 50);
    }

    #[test]
    fn test_bounds_all_and_none() {
        let s = Subject::new("cs301", "CS301", "DSA", "f1")
            .with_unit(unit("done", 1, 4, 4))
            .with_unit(unit("todo", 1, 3, 0));
        let p = ProgressAggregator::default().subject(&s);
        assert_eq!(p.units[0].percentage, 100);
        assert_eq!(p.units[0].status, UnitStatus::Completed);
        assert_eq!(p.units[1].percentage, 0);
        assert_eq!(p.units[1].status, UnitStatus::Pending);
        for u in &p.units {
            assert!(u.percentage <= 100);
        }
    }

    #[test]
    fn test_empty_unit_reports_zero_with_issue() {
        let s = Subject::new("cs301", "CS301", "DSA", "f1")
            .with_unit(unit("full", 1, 2, 2))
            .with_unit(unit("empty", 1, 0, 0));
        let p = ProgressAggregator::default().subject(&s);
        assert_eq!(p.units[1].percentage, 0);
        assert_eq!(p.units[1].issues, vec![UnitIssue::EmptyUnit]);
        assert_eq!(p.percentage, 50);
    }

    #[test]
    fn test_empty_subject_is_zero() {
        let s = Subject::new("cs399", "CS399", "Seminar", "f1");
        assert_eq!(ProgressAggregator::default().subject(&s).percentage, 0);
    }

    #[test]
    fn test_invalid_prerequisite_isolated_to_unit() {
        let bad = Unit::new("u2", "Stacks", PlannedDuration::weeks(2))
            .with_topic(Topic::new("t6", "Stack Implementation").completed().with_prerequisite("t404"));
        let s = Subject::new("cs301", "CS301", "DSA", "f1")
            .with_unit(unit("u1", 1, 2, 1))
            .with_unit(bad);
        let p = ProgressAggregator::default().subject(&s);

        assert!(p.units[0].issues.is_empty());
        assert_eq!(p.units[1].percentage, 100);
        assert_eq!(
            p.units[1].issues,
            vec![UnitIssue::InvalidPrerequisiteReference {
                topic: "t6".into(),
                missing: "t404".into(),
            }]
        );
        assert_eq!(p.issues().count(), 1);
    }

    #[test]
    fn test_cross_unit_prerequisite_is_valid() {
        let s = Subject::new("cs301", "CS301", "DSA", "f1")
            .with_unit(Unit::new("u1", "Lists", PlannedDuration::weeks(1)).with_topic(Topic::new("t3", "Linked List Basics")))
            .with_unit(Unit::new("u2", "Stacks", PlannedDuration::weeks(1)).with_topic(Topic::new("t6", "Stack").with_prerequisite("t3")));
        let p = ProgressAggregator::default().subject(&s);
        assert_eq!(p.issues().count(), 0);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let s = Subject::new("cs301", "CS301", "DSA", "f1")
            .with_unit(unit("u1", 2, 7, 3))
            .with_unit(unit("u2", 3, 3, 1));
        let agg = ProgressAggregator::default();
        assert_eq!(agg.subject(&s), agg.subject(&s));
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(0, 0), 0);
    }
}
