//! Interventions
//!
//! Threshold rules that raise alerts, catch-up plan suggestions and the plan
//! approval lifecycle.

#![warn(missing_docs)]

pub mod config;
pub mod rules;
pub mod suggest;
pub mod engine;
pub mod plans;
mod error;

pub use config::{AlertConfig, Thresholds};
pub use rules::{Finding, RuleEngine};
pub use suggest::{CatchUpAdvisor, MIN_RECOVERY_DAYS};
pub use engine::{InterventionEngine, ScanReport};
pub use plans::{PlanService, Proposal};
pub use error::{InterventionError, Result};
