//! Completion time estimation.

use chrono::Duration;
use syllabus_core::{CompletionEvent, Subject, Time};
use crate::velocity::weekly_rate;

/// Projects when a subject will finish at its recent pace.
#[derive(Debug, Clone, Copy)]
pub struct CompletionEstimator {
    lookback_weeks: u32,
}

impl CompletionEstimator {
    /// Create an estimator measuring pace over the trailing `lookback_weeks`.
    pub fn new(lookback_weeks: u32) -> Self {
        Self { lookback_weeks }
    }

    /// Estimate subject completion time.
    ///
    /// Returns `now` when nothing remains and `None` when topics remain but
    /// nothing was completed in the lookback window, or when the projection
    /// falls off the calendar.
    pub fn estimate_subject(
        &self,
        subject: &Subject,
        events: &[CompletionEvent],
        now: Time,
    ) -> Option<Time> {
        let remaining = subject.total_topics() - subject.completed_topics();
        if remaining == 0 {
            return Some(now);
        }

        let rate = weekly_rate(events, now, self.lookback_weeks);
        if rate <= 0.0 {
            return None;
        }

        let days = (remaining as f64 / rate * 7.0).ceil() as i64;
        Duration::try_days(days).and_then(|d| now.checked_add_signed(d))
    }

    /// Days needed to cover `topics` at the recent pace, if there is one.
    pub fn days_for(&self, topics: usize, events: &[CompletionEvent], now: Time) -> Option<u32> {
        let rate = weekly_rate(events, now, self.lookback_weeks);
        if rate <= 0.0 {
            return None;
        }
        Some((topics as f64 / rate * 7.0).ceil() as u32)
    }
}

impl Default for CompletionEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}
