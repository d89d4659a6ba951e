//! Topic ledger - the only writer of topic completion facts.

use std::sync::Arc;
use serde::Serialize;
use syllabus_core::{CompletionEvent, Session, Subject, SubjectId, Time, TopicId, UnitId};
use syllabus_storage::Storage;
use tracing::{debug, info};
use crate::error::{ProgressError, Result};

/// Outcome of a quick-log submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogReceipt {
    /// Topics that changed to completed
    pub newly_completed: Vec<TopicId>,
    /// Topics that were already completed
    pub already_completed: Vec<TopicId>,
}

/// Records topic completion toggles and appends them to the completion log.
#[derive(Clone)]
pub struct TopicLedger {
    storage: Arc<dyn Storage>,
}

impl TopicLedger {
    /// Create a ledger over a storage backend.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Set one topic's completion flag.
    ///
    /// Returns whether anything changed. Setting the current value is a no-op
    /// and records no event.
    pub async fn set_completion(
        &self,
        session: &Session,
        subject_id: &SubjectId,
        topic_id: &TopicId,
        completed: bool,
        now: Time,
    ) -> Result<bool> {
        let mut subject = self.load_owned(session, subject_id).await?;

        let topic = subject
            .topic_mut(topic_id)
            .ok_or_else(|| ProgressError::TopicNotFound {
                scope: format!("subject {}", subject_id),
                topic: topic_id.clone(),
            })?;

        if topic.completed == completed {
            debug!("Topic {} already {}", topic_id, if completed { "complete" } else { "open" });
            return Ok(false);
        }
        topic.completed = completed;
        topic.completed_at = completed.then_some(now);

        self.storage.save_subject(&subject).await?;
        self.storage
            .append_event(&CompletionEvent::new(
                subject_id.clone(),
                topic_id.clone(),
                session.user.clone(),
                completed,
                now,
            ))
            .await?;

        info!(
            "{} marked {} {} in {}",
            session.name,
            topic_id,
            if completed { "complete" } else { "incomplete" },
            subject_id
        );
        Ok(true)
    }

    /// Quick log: mark several topics of one unit as taught.
    pub async fn log_topics(
        &self,
        session: &Session,
        subject_id: &SubjectId,
        unit_id: &UnitId,
        topics: &[TopicId],
        now: Time,
    ) -> Result<LogReceipt> {
        if subject_id.as_str().trim().is_empty() {
            return Err(ProgressError::MissingField("subject"));
        }
        if unit_id.as_str().trim().is_empty() {
            return Err(ProgressError::MissingField("unit"));
        }
        if topics.is_empty() {
            return Err(ProgressError::MissingField("topics"));
        }

        let mut subject = self.load_owned(session, subject_id).await?;
        let unit = subject
            .units
            .iter_mut()
            .find(|u| &u.id == unit_id)
            .ok_or_else(|| ProgressError::UnitNotFound {
                subject: subject_id.clone(),
                unit: unit_id.clone(),
            })?;

        // Validate the whole batch before touching anything.
        for topic_id in topics {
            if !unit.topics.iter().any(|t| &t.id == topic_id) {
                return Err(ProgressError::TopicNotFound {
                    scope: format!("unit {}", unit_id),
                    topic: topic_id.clone(),
                });
            }
        }

        let mut receipt = LogReceipt::default();
        for topic in unit.topics.iter_mut().filter(|t| topics.contains(&t.id)) {
            if topic.completed {
                receipt.already_completed.push(topic.id.clone());
            } else {
                topic.completed = true;
                topic.completed_at = Some(now);
                receipt.newly_completed.push(topic.id.clone());
            }
        }

        if receipt.newly_completed.is_empty() {
            return Ok(receipt);
        }

        self.storage.save_subject(&subject).await?;
        for topic_id in &receipt.newly_completed {
            self.storage
                .append_event(&CompletionEvent::new(
                    subject_id.clone(),
                    topic_id.clone(),
                    session.user.clone(),
                    true,
                    now,
                ))
                .await?;
        }

        info!(
            "{} logged {} topics in {}/{}",
            session.name,
            receipt.newly_completed.len(),
            subject_id,
            unit_id
        );
        Ok(receipt)
    }

    async fn load_owned(&self, session: &Session, subject_id: &SubjectId) -> Result<Subject> {
        let subject = self
            .storage
            .load_subject(subject_id)
            .await?
            .ok_or_else(|| ProgressError::SubjectNotFound(subject_id.clone()))?;

        if subject.faculty != session.user {
            return Err(ProgressError::NotOwner {
                user: session.user.clone(),
                subject: subject_id.clone(),
            });
        }
        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use syllabus_core::{PlannedDuration, Topic, Unit};
    use syllabus_storage::MemoryStorage;
    use crate::velocity::{weekly_rate, WeeklyCompletions};

    async fn ledger() -> (TopicLedger, Arc<dyn Storage>) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let subject = Subject::new("cs301", "CS301", "DSA", "f1").with_unit(
            Unit::new("unit2", "Stacks and Queues", PlannedDuration::weeks(2))
                .with_topic(Topic::new("t8", "Queue Implementation").completed())
                .with_topic(Topic::new("t9", "Circular Queue").with_prerequisite("t8"))
                .with_topic(Topic::new("t10", "Priority Queue").with_prerequisite("t9")),
        );
        storage.save_subject(&subject).await.unwrap();
        (TopicLedger::new(storage.clone()), storage)
    }

    fn owner() -> Session {
        Session::faculty("f1", "Dr. Sarah Johnson")
    }

    #[tokio::test]
    async fn test_toggle_records_event() {
        let (ledger, storage) = ledger().await;
        let now = Utc::now();

        let changed = ledger
            .set_completion(&owner(), &"cs301".into(), &"t9".into(), true, now)
            .await
            .unwrap();
        assert!(changed);

        let subject = storage.load_subject(&"cs301".into()).await.unwrap().unwrap();
        let topic = subject.topic(&"t9".into()).unwrap();
        assert!(topic.completed);
        assert_eq!(topic.completed_at, Some(now));

        let events = storage.list_events(None).await.unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].completed);
    }

    #[tokio::test]
    async fn test_toggle_to_same_value_is_noop() {
        let (ledger, storage) = ledger().await;
        let changed = ledger
            .set_completion(&owner(), &"cs301".into(), &"t8".into(), true, Utc::now())
            .await
            .unwrap();
        assert!(!changed);
        assert!(storage.list_events(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undo_clears_timestamp() {
        let (ledger, storage) = ledger().await;
        ledger
            .set_completion(&owner(), &"cs301".into(), &"t8".into(), false, Utc::now())
            .await
            .unwrap();
        let subject = storage.load_subject(&"cs301".into()).await.unwrap().unwrap();
        let topic = subject.topic(&"t8".into()).unwrap();
        assert!(!topic.completed);
        assert!(topic.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_only_owner_may_toggle() {
        let (ledger, _) = ledger().await;
        let other = Session::faculty("f2", "Prof. Michael Chen");
        let err = ledger
            .set_completion(&other, &"cs301".into(), &"t9".into(), true, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::NotOwner { .. }));

        let hod = Session::head_of_department("hod", "Head");
        assert!(ledger
            .set_completion(&hod, &"cs301".into(), &"t9".into(), true, Utc::now())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_undo_leaves_weekly_count_unchanged() {
        let (ledger, storage) = ledger().await;
        let subject: SubjectId = "cs301".into();
        let now = Utc::now();
        let before = WeeklyCompletions::from_events(&storage.list_events(None).await.unwrap(), now);

        for (i, (topic, completed)) in [("t9", true), ("t9", false), ("t10", true), ("t10", false), ("t10", true)]
            .into_iter()
            .enumerate()
        {
            let at = now - chrono::Duration::minutes(10 - i as i64);
            ledger
                .set_completion(&owner(), &subject, &topic.into(), completed, at)
                .await
                .unwrap();
        }

        let events = storage.list_events(None).await.unwrap();
        assert_eq!(events.len(), 5);
        let after = WeeklyCompletions::from_events(&events, now);
        assert_eq!(after.this_week, before.this_week + 1);
        assert_eq!(weekly_rate(&events, now, 1), 1.0);
    }

    #[tokio::test]
    async fn test_log_requires_all_fields() {
        let (ledger, _) = ledger().await;
        let now = Utc::now();

        let err = ledger
            .log_topics(&owner(), &"".into(), &"unit2".into(), &["t9".into()], now)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::MissingField("subject")));

        let err = ledger
            .log_topics(&owner(), &"cs301".into(), &"".into(), &["t9".into()], now)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::MissingField("unit")));

        let err = ledger
            .log_topics(&owner(), &"cs301".into(), &"unit2".into(), &[], now)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::MissingField("topics")));
    }

    #[tokio::test]
    async fn test_log_batch() {
        let (ledger, storage) = ledger().await;
        let receipt = ledger
            .log_topics(
                &owner(),
                &"cs301".into(),
                &"unit2".into(),
                &["t8".into(), "t9".into(), "t10".into()],
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(receipt.newly_completed, vec![TopicId::new("t9"), TopicId::new("t10")]);
        assert_eq!(receipt.already_completed, vec![TopicId::new("t8")]);
        assert_eq!(storage.list_events(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_log_rejects_topic_from_other_unit() {
        let (ledger, storage) = ledger().await;
        let err = ledger
            .log_topics(
                &owner(),
                &"cs301".into(),
                &"unit2".into(),
                &["t9".into(), "t1".into()],
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::TopicNotFound { .. }));

        let subject = storage.load_subject(&"cs301".into()).await.unwrap().unwrap();
        assert!(!subject.topic(&"t9".into()).unwrap().completed);
    }
}
