//! Progress Tracking
//!
//! Topic ledger, progress aggregation, velocity classification, prerequisite
//! analysis, completion estimates and department, faculty and intervention
//! reports.

#![warn(missing_docs)]

pub mod aggregator;
pub mod schedule;
pub mod velocity;
pub mod prerequisites;
pub mod estimator;
pub mod ledger;
pub mod tracker;
pub mod department;
mod error;

pub use aggregator::{percent, ProgressAggregator, SubjectProgress, UnitIssue, UnitProgress, Weighting};
pub use schedule::TermSchedule;
pub use velocity::{classify, weekly_rate, Trend, Velocity, VelocityConfig, WeeklyCompletions};
pub use prerequisites::{PrerequisiteAnalysis, PrerequisiteAnalyzer, PrerequisiteGap, PrerequisiteStats};
pub use estimator::CompletionEstimator;
pub use ledger::{LogReceipt, TopicLedger};
pub use tracker::{BasicProgressTracker, ProgressSnapshot, ProgressTracker, SubjectStatus};
pub use department::{
    alert_counts, department_stats, faculty_comparison, faculty_row, plan_counts, AlertCounts,
    DepartmentReport, DepartmentStats, FacultyComparison, FacultyReport, FacultyRow,
    InterventionReport, PlanCounts, ReportBuilder,
};
pub use error::{ProgressError, Result};
