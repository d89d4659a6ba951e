//! Teaching velocity: classification against the baseline and completion rates.

use std::collections::HashMap;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use syllabus_core::{CompletionEvent, SubjectId, Time, TopicId};
use crate::aggregator::Weighting;

/// Velocity classification of a subject or faculty member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Velocity {
    /// More than the tolerance ahead of the baseline
    Ahead,
    /// Within the tolerance band
    OnTrack,
    /// More than the tolerance behind the baseline
    Delayed,
}

impl Velocity {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Velocity::Ahead => "ahead",
            Velocity::OnTrack => "on-track",
            Velocity::Delayed => "delayed",
        }
    }
}

/// Velocity configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Half-width of the on-track band, in percentage points
    pub tolerance: f64,
    /// Unit weighting for aggregation and baseline
    pub weighting: Weighting,
    /// Trailing window for the weekly completion rate
    pub lookback_weeks: u32,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            tolerance: 10.0,
            weighting: Weighting::Equal,
            lookback_weeks: 4,
        }
    }
}

/// Classify `current` against `expected`. Band edges count as on-track.
pub fn classify(current: f64, expected: f64, tolerance: f64) -> Velocity {
    let diff = current - expected;
    if diff > tolerance {
        Velocity::Ahead
    } else if diff < -tolerance {
        Velocity::Delayed
    } else {
        Velocity::OnTrack
    }
}

/// Topic completions in the last two weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeeklyCompletions {
    /// Completions in the 7 days up to now
    pub this_week: usize,
    /// Completions in the 7 days before that
    pub last_week: usize,
}

impl WeeklyCompletions {
    /// Count completions from the log as of `now`.
    pub fn from_events(events: &[CompletionEvent], now: Time) -> Self {
        let week = Duration::days(7);
        Self {
            this_week: completions_between(events, now - week, now),
            last_week: completions_between(events, now - week - week, now - week),
        }
    }

    /// Percentage fall from last week to this week. `None` without a
    /// previous-week baseline; negative when the rate rose.
    pub fn drop_percent(&self) -> Option<f64> {
        if self.last_week == 0 {
            return None;
        }
        let last = self.last_week as f64;
        Some((last - self.this_week as f64) / last * 100.0)
    }

    /// Trend direction for comparisons.
    pub fn trend(&self) -> Trend {
        match self.this_week.cmp(&self.last_week) {
            std::cmp::Ordering::Greater => Trend::Up,
            std::cmp::Ordering::Less => Trend::Down,
            std::cmp::Ordering::Equal => Trend::Stable,
        }
    }
}

/// Week-over-week trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// More completions than the week before
    Up,
    /// Same as the week before
    Stable,
    /// Fewer completions than the week before
    Down,
}

/// Completions per week over the trailing `weeks`. A window reaching past
/// the representable calendar counts the whole log.
pub fn weekly_rate(events: &[CompletionEvent], now: Time, weeks: u32) -> f64 {
    if weeks == 0 {
        return 0.0;
    }
    let since = Duration::try_weeks(weeks as i64)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    completions_between(events, since, now) as f64 / weeks as f64
}

/// Topics whose last toggle in `(from, to]` left them completed.
///
/// Completing, undoing and completing again counts once; completing then
/// undoing counts nothing.
fn completions_between(events: &[CompletionEvent], from: Time, to: Time) -> usize {
    let mut latest: HashMap<(&SubjectId, &TopicId), &CompletionEvent> = HashMap::new();
    for event in events.iter().filter(|e| e.timestamp > from && e.timestamp <= to) {
        latest
            .entry((&event.subject_id, &event.topic_id))
            .and_modify(|seen| {
                if event.timestamp >= seen.timestamp {
                    *seen = event;
                }
            })
            .or_insert(event);
    }
    latest.values().filter(|e| e.completed).count()
}
