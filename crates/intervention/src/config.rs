//! Intervention thresholds and switches.

use serde::{Deserialize, Serialize};
use syllabus_core::Severity;

/// Rule thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Points behind the baseline before a progress-delay alert
    pub progress_delay: f64,

    /// Week-over-week fall, in percent, before a velocity-drop alert
    pub velocity_drop: f64,

    /// Days a prerequisite gap may stand before it is reported
    pub prerequisite_gap_days: u32,

    /// Multiple of a threshold at which severity becomes high
    pub high_severity_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            progress_delay: 10.0,
            velocity_drop: 20.0,
            prerequisite_gap_days: 1,
            high_severity_ratio: 1.25,
        }
    }
}

impl Thresholds {
    /// Severity of a measurement that already exceeded `threshold`.
    pub fn severity(&self, observed: f64, threshold: f64) -> Severity {
        if observed >= threshold * self.high_severity_ratio {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

/// Automated alert switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Persist scan results
    pub enabled: bool,

    /// Propose catch-up plans for new alerts
    pub suggest_plans: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            suggest_plans: true,
        }
    }
}
