//! Expected-progress baseline from the term calendar and unit plan.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use syllabus_core::{Subject, Time};
use crate::aggregator::{combine, Weighting};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Teaching term calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermSchedule {
    /// First teaching day
    pub start: NaiveDate,
    /// Length in weeks, used when units carry no planned durations
    pub weeks: u32,
}

impl Default for TermSchedule {
    fn default() -> Self {
        Self {
            start: Utc::now().date_naive(),
            weeks: 16,
        }
    }
}

impl TermSchedule {
    /// Create a schedule.
    pub fn new(start: NaiveDate, weeks: u32) -> Self {
        Self { start, weeks }
    }

    /// Start of the term as a UTC instant.
    pub fn start_time(&self) -> Time {
        Utc.from_utc_datetime(&self.start.and_time(NaiveTime::MIN))
    }

    /// Fractional days elapsed since the term started (negative before it).
    pub fn elapsed_days(&self, now: Time) -> f64 {
        (now - self.start_time()).num_seconds() as f64 / SECONDS_PER_DAY
    }

    /// Linear expectation over the whole term.
    pub fn linear_expected(&self, now: Time) -> u8 {
        share(self.elapsed_days(now), self.weeks as f64 * 7.0)
    }

    /// Expected progress of a subject at `now`.
    ///
    /// Units are scheduled back to back from the term start; each unit is
    /// expected to be the elapsed share of its own window.
    pub fn expected_progress(&self, subject: &Subject, weighting: Weighting, now: Time) -> u8 {
        if subject.planned_duration().is_zero() {
            return self.linear_expected(now);
        }

        let elapsed = self.elapsed_days(now);
        let mut offset = 0.0;
        let mut expected = Vec::with_capacity(subject.units.len());
        for unit in &subject.units {
            let length = unit.duration.as_days() as f64;
            expected.push(share(elapsed - offset, length));
            offset += length;
        }

        let weights: Vec<u32> = subject.units.iter().map(|u| u.duration.as_days()).collect();
        combine(&expected, &weights, weighting)
    }
}

/// Elapsed share of a window as a clamped percentage. A zero-length window is
/// fully expected once reached.
fn share(elapsed: f64, length: f64) -> u8 {
    if length <= 0.0 {
        return if elapsed >= 0.0 { 100 } else { 0 };
    }
    ((elapsed / length) * 100.0).clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use syllabus_core::{PlannedDuration, Unit};

    fn term() -> TermSchedule {
        TermSchedule::new(NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(), 10)
    }

    fn subject() -> Subject {
        Subject::new("cs301", "CS301", "DSA", "f1")
            .with_unit(Unit::new("u1", "Arrays", PlannedDuration::weeks(3)))
            .with_unit(Unit::new("u2", "Stacks", PlannedDuration::weeks(2)))
            .with_unit(Unit::new("u3", "Trees", PlannedDuration::weeks(4)))
    }

    #[test]
    fn test_before_term_expects_nothing() {
        let now = term().start_time() - Duration::days(3);
        assert_eq!(term().expected_progress(&subject(), Weighting::Equal, now), 0);
    }

    #[test]
    fn test_unit_windows_back_to_back() {
        // Four weeks in: unit 1 done, unit 2 half way, unit 3 not started.
        let now = term().start_time() + Duration::weeks(4);
        assert_eq!(term().expected_progress(&subject(), Weighting::Equal, now), 50);
        // Duration weighted: (3*100 + 2*50 + 0) / 9 weeks = 44.4
        assert_eq!(term().expected_progress(&subject(), Weighting::Duration, now), 44);
    }

    #[test]
    fn test_after_plan_expects_everything() {
        let now = term().start_time() + Duration::weeks(12);
        assert_eq!(term().expected_progress(&subject(), Weighting::Equal, now), 100);
    }

    #[test]
    fn test_falls_back_to_term_length() {
        let s = Subject::new("cs302", "CS302", "DBMS", "f1")
            .with_unit(Unit::new("u1", "Intro", PlannedDuration::default()));
        let now = term().start_time() + Duration::weeks(5);
        assert_eq!(term().expected_progress(&s, Weighting::Equal, now), 50);
    }
}
