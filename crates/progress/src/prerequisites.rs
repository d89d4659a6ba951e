//! Prerequisite analysis.
//!
//! This module inspects a subject's prerequisite graph:
//! - Gap detection (a topic completed before its prerequisite)
//! - References to topics that do not exist in the subject
//! - Circular prerequisite chains
//! - Statistics for reporting

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use syllabus_core::{Subject, Time, Topic, TopicId, UnitId};

/// A topic that was completed while its prerequisite was not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrerequisiteGap {
    /// Completed topic
    pub topic_id: TopicId,
    /// Completed topic name
    pub topic_name: String,
    /// Unit containing the completed topic
    pub unit_id: UnitId,
    /// Incomplete prerequisite
    pub prerequisite_id: TopicId,
    /// Incomplete prerequisite name
    pub prerequisite_name: String,
    /// When the dependent topic was completed, if recorded
    pub completed_at: Option<Time>,
}

impl PrerequisiteGap {
    /// Whether the gap has lasted at least `grace_days` at `now`. Gaps
    /// without a completion time are always considered persisted.
    pub fn persisted(&self, grace_days: u32, now: Time) -> bool {
        match self.completed_at {
            Some(at) => now - at >= chrono::Duration::days(grace_days as i64),
            None => true,
        }
    }
}

/// Prerequisite statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteStats {
    /// Topics declaring a prerequisite
    pub linked_topics: usize,
    /// Gaps detected
    pub gaps: usize,
    /// References to unknown topics
    pub invalid_references: usize,
    /// Topics taking part in a cycle
    pub topics_in_cycles: usize,
}

/// Result of prerequisite analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrerequisiteAnalysis {
    /// Detected gaps in syllabus order
    pub gaps: Vec<PrerequisiteGap>,
    /// `(topic, missing prerequisite)` pairs
    pub invalid_references: Vec<(TopicId, TopicId)>,
    /// Circular prerequisite chains
    pub cycles: Vec<Vec<TopicId>>,
    /// Statistics
    pub stats: PrerequisiteStats,
}

/// Analyzes the prerequisite graph of a subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrerequisiteAnalyzer;

impl PrerequisiteAnalyzer {
    /// Create a new analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Run every check on a subject.
    pub fn analyze(&self, subject: &Subject) -> PrerequisiteAnalysis {
        let topic_map: HashMap<&TopicId, &Topic> = subject.topics().map(|t| (&t.id, t)).collect();

        let gaps = self.detect_gaps(subject);
        let invalid_references = self.detect_invalid_references(subject, &topic_map);
        let cycles = self.detect_cycles(subject, &topic_map);

        let stats = PrerequisiteStats {
            linked_topics: subject.topics().filter(|t| t.prerequisite.is_some()).count(),
            gaps: gaps.len(),
            invalid_references: invalid_references.len(),
            topics_in_cycles: cycles.iter().map(Vec::len).sum(),
        };

        PrerequisiteAnalysis {
            gaps,
            invalid_references,
            cycles,
            stats,
        }
    }

    /// Detect completed topics whose prerequisite is incomplete.
    ///
    /// An incomplete topic with a completed prerequisite is normal teaching
    /// order and never a gap.
    pub fn detect_gaps(&self, subject: &Subject) -> Vec<PrerequisiteGap> {
        let mut gaps = Vec::new();

        for unit in &subject.units {
            for topic in unit.topics.iter().filter(|t| t.completed) {
                let Some(prerequisite_id) = &topic.prerequisite else {
                    continue;
                };
                let Some(prerequisite) = subject.topic(prerequisite_id) else {
                    continue;
                };
                if !prerequisite.completed {
                    gaps.push(PrerequisiteGap {
                        topic_id: topic.id.clone(),
                        topic_name: topic.name.clone(),
                        unit_id: unit.id.clone(),
                        prerequisite_id: prerequisite.id.clone(),
                        prerequisite_name: prerequisite.name.clone(),
                        completed_at: topic.completed_at,
                    });
                }
            }
        }

        gaps
    }

    fn detect_invalid_references(
        &self,
        subject: &Subject,
        topic_map: &HashMap<&TopicId, &Topic>,
    ) -> Vec<(TopicId, TopicId)> {
        subject
            .topics()
            .filter_map(|t| {
                let prerequisite = t.prerequisite.as_ref()?;
                (!topic_map.contains_key(prerequisite)).then(|| (t.id.clone(), prerequisite.clone()))
            })
            .collect()
    }

    /// Detect circular prerequisite chains.
    fn detect_cycles(
        &self,
        subject: &Subject,
        topic_map: &HashMap<&TopicId, &Topic>,
    ) -> Vec<Vec<TopicId>> {
        let mut cycles = Vec::new();
        let mut visited: HashSet<TopicId> = HashSet::new();

        // Walk in syllabus order so results are deterministic.
        for topic in subject.topics() {
            if !visited.contains(&topic.id) {
                let mut recursion_stack = HashSet::new();
                if let Some(cycle) = self.find_cycle(
                    &topic.id,
                    topic_map,
                    &mut visited,
                    &mut recursion_stack,
                    &mut Vec::new(),
                ) {
                    cycles.push(cycle);
                }
            }
        }

        cycles
    }

    /// Follow the prerequisite chain from a node using DFS.
    fn find_cycle(
        &self,
        node: &TopicId,
        topic_map: &HashMap<&TopicId, &Topic>,
        visited: &mut HashSet<TopicId>,
        recursion_stack: &mut HashSet<TopicId>,
        path: &mut Vec<TopicId>,
    ) -> Option<Vec<TopicId>> {
        visited.insert(node.clone());
        recursion_stack.insert(node.clone());
        path.push(node.clone());

        if let Some(next) = topic_map.get(node).and_then(|t| t.prerequisite.as_ref()) {
            if !visited.contains(next) {
                if let Some(cycle) = self.find_cycle(next, topic_map, visited, recursion_stack, path) {
                    return Some(cycle);
                }
            } else if recursion_stack.contains(next) {
                let start = path.iter().position(|id| id == next)?;
                return Some(path[start..].to_vec());
            }
        }

        path.pop();
        recursion_stack.remove(node);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use syllabus_core::{PlannedDuration, Unit};

    /// The CS301 syllabus as mapped on the faculty dashboard.
    fn cs301() -> Subject {
        Subject::new("cs301", "CS301", "Data Structures & Algorithms", "f1")
            .with_unit(
                Unit::new("unit1", "Arrays and Linked Lists", PlannedDuration::weeks(3))
                    .with_topic(Topic::new("t1", "Introduction to Arrays").completed())
                    .with_topic(Topic::new("t2", "Array Operations").with_prerequisite("t1").completed())
                    .with_topic(Topic::new("t3", "Linked List Basics").with_prerequisite("t2").completed()),
            )
            .with_unit(
                Unit::new("unit2", "Stacks and Queues", PlannedDuration::weeks(2))
                    .with_topic(Topic::new("t6", "Stack Implementation").with_prerequisite("t3").completed())
                    .with_topic(Topic::new("t7", "Stack Applications").with_prerequisite("t6").completed())
                    .with_topic(Topic::new("t8", "Queue Implementation").with_prerequisite("t7").completed())
                    .with_topic(Topic::new("t9", "Circular Queue").with_prerequisite("t8"))
                    .with_topic(Topic::new("t10", "Priority Queue").with_prerequisite("t9")),
            )
    }

    #[test]
    fn test_incomplete_topic_after_complete_prerequisite_is_not_a_gap() {
        let analysis = PrerequisiteAnalyzer::new().analyze(&cs301());
        assert!(analysis.gaps.is_empty());
        assert_eq!(analysis.stats.linked_topics, 7);
    }

    #[test]
    fn test_completing_before_prerequisite_is_a_gap() {
        let mut s = cs301();
        s.topic_mut(&"t10".into()).unwrap().completed = true;

        let gaps = PrerequisiteAnalyzer::new().detect_gaps(&s);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].topic_name, "Priority Queue");
        assert_eq!(gaps[0].prerequisite_name, "Circular Queue");
        assert_eq!(gaps[0].unit_id, UnitId::new("unit2"));
    }

    #[test]
    fn test_gap_grace_period() {
        let now = Utc::now();
        let mut gap = PrerequisiteGap {
            topic_id: "t10".into(),
            topic_name: "Priority Queue".into(),
            unit_id: "unit2".into(),
            prerequisite_id: "t9".into(),
            prerequisite_name: "Circular Queue".into(),
            completed_at: Some(now - Duration::hours(12)),
        };
        assert!(!gap.persisted(1, now));
        assert!(gap.persisted(0, now));
        gap.completed_at = None;
        assert!(gap.persisted(1, now));
    }

    #[test]
    fn test_invalid_reference_detected_not_gap() {
        let mut s = cs301();
        s.topic_mut(&"t6".into()).unwrap().prerequisite = Some("t404".into());
        let analysis = PrerequisiteAnalyzer::new().analyze(&s);
        assert_eq!(
            analysis.invalid_references,
            vec![(TopicId::new("t6"), TopicId::new("t404"))]
        );
        assert!(analysis.gaps.is_empty());
    }

    #[test]
    fn test_cycle_detection() {
        let s = Subject::new("cs9", "CS9", "Loop", "f1").with_unit(
            Unit::new("u1", "Loop", PlannedDuration::weeks(1))
                .with_topic(Topic::new("a", "A").with_prerequisite("c"))
                .with_topic(Topic::new("b", "B").with_prerequisite("a"))
                .with_topic(Topic::new("c", "C").with_prerequisite("b"))
                .with_topic(Topic::new("d", "D").with_prerequisite("a")),
        );
        let analysis = PrerequisiteAnalyzer::new().analyze(&s);
        assert_eq!(analysis.cycles.len(), 1);
        assert_eq!(analysis.cycles[0].len(), 3);
        assert_eq!(analysis.stats.topics_in_cycles, 3);
    }

    #[test]
    fn test_acyclic_chain_has_no_cycles() {
        let analysis = PrerequisiteAnalyzer::new().analyze(&cs301());
        assert!(analysis.cycles.is_empty());
    }
}
