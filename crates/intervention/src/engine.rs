//! Intervention engine: runs the rules over storage and keeps alerts current.

use std::sync::Arc;
use serde::Serialize;
use syllabus_core::{
    AlertId, AlertStatus, CatchUpPlan, CompletionEvent, PlanId, Subject, Time,
};
use syllabus_progress::BasicProgressTracker;
use syllabus_storage::{AlertFilter, PlanFilter, Storage};
use tracing::{debug, info, warn};
use crate::config::{AlertConfig, Thresholds};
use crate::error::Result;
use crate::rules::{Finding, RuleEngine};
use crate::suggest::CatchUpAdvisor;

/// Result of a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    /// Everything the rules found
    pub findings: Vec<Finding>,
    /// Alerts raised by this scan
    pub created: Vec<AlertId>,
    /// Open alerts whose severity or description changed
    pub updated: Vec<AlertId>,
    /// Open alerts that already matched their finding
    pub unchanged: Vec<AlertId>,
    /// Plans suggested for alerts without one
    pub suggested: Vec<PlanId>,
    /// Whether anything was written
    pub persisted: bool,
}

/// Scans subjects and maintains intervention alerts.
pub struct InterventionEngine {
    storage: Arc<dyn Storage>,
    tracker: BasicProgressTracker,
    rules: RuleEngine,
    advisor: CatchUpAdvisor,
    alerts: AlertConfig,
}

impl InterventionEngine {
    /// Create an engine.
    pub fn new(
        storage: Arc<dyn Storage>,
        tracker: BasicProgressTracker,
        thresholds: Thresholds,
        alerts: AlertConfig,
    ) -> Self {
        let advisor = CatchUpAdvisor::new(tracker.velocity_config().lookback_weeks);
        Self {
            storage,
            tracker,
            rules: RuleEngine::new(thresholds),
            advisor,
            alerts,
        }
    }

    /// Evaluate every subject without writing anything.
    pub async fn evaluate(&self, now: Time) -> Result<Vec<Finding>> {
        let subjects = self.storage.list_subjects().await?;
        let events = self.storage.list_events(None).await?;
        Ok(self.findings(&subjects, &events, now))
    }

    /// Evaluate every subject and upsert open alerts.
    ///
    /// An open alert with the same (type, subject) is updated in place, never
    /// duplicated. Alerts whose finding no longer holds stay open.
    pub async fn scan(&self, now: Time) -> Result<ScanReport> {
        let subjects = self.storage.list_subjects().await?;
        let events = self.storage.list_events(None).await?;
        let findings = self.findings(&subjects, &events, now);

        let mut report = ScanReport {
            findings: findings.clone(),
            ..Default::default()
        };

        if !self.alerts.enabled {
            info!("Automated alerts disabled, {} findings not recorded", findings.len());
            return Ok(report);
        }
        report.persisted = true;

        let mut open = self.storage.list_alerts(&AlertFilter::open()).await?;
        for finding in findings {
            match open.iter_mut().find(|a| a.key() == finding.key()) {
                Some(alert) => {
                    if alert.severity == finding.severity && alert.description == finding.description {
                        report.unchanged.push(alert.id);
                        continue;
                    }
                    alert.severity = finding.severity;
                    alert.description = finding.description;
                    alert.updated_at = now;
                    self.storage.save_alert(alert).await?;
                    debug!("Updated alert {} for {}", alert.id, alert.subject_id);
                    report.updated.push(alert.id);
                }
                None => {
                    let alert = finding.into_alert(now);
                    self.storage.save_alert(&alert).await?;
                    info!(
                        "Raised {} alert for {}: {}",
                        alert.alert_type.as_str(),
                        alert.subject_id,
                        alert.description
                    );
                    report.created.push(alert.id);
                    open.push(alert);
                }
            }
        }

        if self.alerts.suggest_plans {
            report.suggested = self
                .suggest(&subjects, &events, now)
                .await?
                .into_iter()
                .map(|p| p.id)
                .collect();
        }

        info!(
            "Scan complete: {} created, {} updated, {} unchanged, {} plans suggested",
            report.created.len(),
            report.updated.len(),
            report.unchanged.len(),
            report.suggested.len()
        );
        Ok(report)
    }

    /// Suggest a plan for every active alert that no plan addresses yet.
    pub async fn suggest_plans(&self, now: Time) -> Result<Vec<CatchUpPlan>> {
        let subjects = self.storage.list_subjects().await?;
        let events = self.storage.list_events(None).await?;
        self.suggest(&subjects, &events, now).await
    }

    fn findings(&self, subjects: &[Subject], events: &[CompletionEvent], now: Time) -> Vec<Finding> {
        subjects
            .iter()
            .flat_map(|subject| {
                let status = self.tracker.assess(subject, events, now);
                self.rules.evaluate(subject, &status, now)
            })
            .collect()
    }

    async fn suggest(
        &self,
        subjects: &[Subject],
        events: &[CompletionEvent],
        now: Time,
    ) -> Result<Vec<CatchUpPlan>> {
        let plans = self.storage.list_plans(&PlanFilter::default()).await?;
        let active = self
            .storage
            .list_alerts(&AlertFilter {
                status: Some(vec![AlertStatus::Active]),
                ..Default::default()
            })
            .await?;

        let mut suggested = Vec::new();
        for mut alert in active {
            if plans.iter().any(|p| p.addresses.contains(&alert.id)) {
                continue;
            }
            let Some(subject) = subjects.iter().find(|s| s.id == alert.subject_id) else {
                warn!("Alert {} refers to unknown subject {}", alert.id, alert.subject_id);
                continue;
            };

            let own: Vec<CompletionEvent> = events
                .iter()
                .filter(|e| e.subject_id == subject.id)
                .cloned()
                .collect();
            let status = self.tracker.assess(subject, &own, now);
            let plan = self.advisor.draft(&alert, subject, &status, &own, now);

            self.storage.save_plan(&plan).await?;
            alert.mark_pending(now)?;
            self.storage.save_alert(&alert).await?;
            info!("Suggested plan {} for alert {}", plan.id, alert.id);
            suggested.push(plan);
        }
        Ok(suggested)
    }
}
