//! Planned durations written in syllabus notation ("3 weeks", "10 days").

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Error returned when a planned duration cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid planned duration '{0}': expected e.g. \"3 weeks\" or \"10 days\"")]
pub struct DurationParseError(pub String);

/// A planned teaching duration, stored as whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlannedDuration {
    days: u32,
}

fn notation() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\s*(d|days?|w|wks?|weeks?)\s*$").ok())
        .as_ref()
}

impl PlannedDuration {
    /// Duration of the given number of days.
    pub fn days(days: u32) -> Self {
        Self { days }
    }

    /// Duration of the given number of weeks.
    pub fn weeks(weeks: u32) -> Self {
        Self { days: weeks * 7 }
    }

    /// Total length in days.
    pub fn as_days(&self) -> u32 {
        self.days
    }

    /// Whether the duration is zero.
    pub fn is_zero(&self) -> bool {
        self.days == 0
    }

    /// Parse syllabus notation. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, DurationParseError> {
        let lowered = s.to_lowercase();
        let caps = notation()
            .and_then(|re| re.captures(&lowered))
            .ok_or_else(|| DurationParseError(s.to_string()))?;
        let amount: u32 = caps[1]
            .parse()
            .map_err(|_| DurationParseError(s.to_string()))?;
        if caps[2].starts_with('w') {
            amount
                .checked_mul(7)
                .map(Self::days)
                .ok_or_else(|| DurationParseError(s.to_string()))
        } else {
            Ok(Self::days(amount))
        }
    }
}

impl std::fmt::Display for PlannedDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.days {
            7 => write!(f, "1 week"),
            d if d > 0 && d % 7 == 0 => write!(f, "{} weeks", d / 7),
            1 => write!(f, "1 day"),
            d => write!(f, "{} days", d),
        }
    }
}

impl std::str::FromStr for PlannedDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlannedDuration {
    type Error = DurationParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PlannedDuration> for String {
    fn from(d: PlannedDuration) -> Self {
        d.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weeks_and_days() {
        assert_eq!(PlannedDuration::parse("3 weeks").unwrap().as_days(), 21);
        assert_eq!(PlannedDuration::parse("1 Week").unwrap().as_days(), 7);
        assert_eq!(PlannedDuration::parse("10 days").unwrap().as_days(), 10);
        assert_eq!(PlannedDuration::parse("2w").unwrap().as_days(), 14);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(PlannedDuration::parse("soon").is_err());
        assert!(PlannedDuration::parse("3 months").is_err());
        assert!(PlannedDuration::parse("").is_err());
    }

    #[test]
    fn test_display_prefers_weeks() {
        assert_eq!(PlannedDuration::weeks(4).to_string(), "4 weeks");
        assert_eq!(PlannedDuration::days(9).to_string(), "9 days");
        assert_eq!(PlannedDuration::days(1).to_string(), "1 day");
    }

    #[test]
    fn test_serde_uses_notation() {
        let json = serde_json::to_string(&PlannedDuration::weeks(2)).unwrap();
        assert_eq!(json, "\"2 weeks\"");
        let back: PlannedDuration = serde_json::from_str("\"3 weeks\"").unwrap();
        assert_eq!(back, PlannedDuration::weeks(3));
        assert!(serde_json::from_str::<PlannedDuration>("\"later\"").is_err());
    }
}
