//! Catch-up plan lifecycle.
//!
//! Plans move `proposed -> approved | rejected`, only on an explicit decision
//! by a head of department. Addressed alerts follow the plan: proposing marks
//! them pending, approval resolves them, rejection makes them active again.

use std::sync::Arc;
use syllabus_core::{
    Alert, AlertId, AlertStatus, CatchUpPlan, PlanId, PlanOrigin, PlanStatus, Session, SubjectId,
    Time, TransitionError,
};
use syllabus_storage::{PlanFilter, Storage};
use tracing::info;
use crate::error::{InterventionError, Result};

/// Manual plan proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Subject to catch up
    pub subject_id: SubjectId,
    /// Remediation description
    pub description: String,
    /// Estimated recovery in days
    pub estimated_recovery_days: u32,
    /// Alerts the plan addresses
    pub alerts: Vec<AlertId>,
}

/// Plan lifecycle service.
#[derive(Clone)]
pub struct PlanService {
    storage: Arc<dyn Storage>,
}

impl PlanService {
    /// Create a plan service.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Propose a plan by hand. Allowed for the owning faculty and heads of
    /// department.
    pub async fn propose(
        &self,
        session: &Session,
        proposal: Proposal,
        now: Time,
    ) -> Result<CatchUpPlan> {
        if proposal.description.trim().is_empty() {
            return Err(InterventionError::MissingField("description"));
        }

        let subject = self
            .storage
            .load_subject(&proposal.subject_id)
            .await?
            .ok_or_else(|| InterventionError::SubjectNotFound(proposal.subject_id.clone()))?;

        if !session.is_head_of_department() && subject.faculty != session.user {
            return Err(InterventionError::Unauthorized {
                user: session.user.clone(),
                action: "propose a plan for this subject",
            });
        }

        // Load and check every alert before writing anything.
        let mut alerts = Vec::with_capacity(proposal.alerts.len());
        for id in &proposal.alerts {
            let alert = self.load_alert(*id).await?;
            if alert.subject_id != subject.id {
                return Err(InterventionError::SubjectMismatch {
                    alert: alert.id,
                    expected: subject.id.clone(),
                    actual: alert.subject_id,
                });
            }
            if alert.status == AlertStatus::Resolved {
                return Err(TransitionError::new(
                    AlertStatus::Resolved.as_str(),
                    AlertStatus::Pending.as_str(),
                )
                .into());
            }
            alerts.push(alert);
        }

        let mut plan = CatchUpPlan::propose(
            subject.id.clone(),
            subject.faculty.clone(),
            proposal.description.trim(),
            proposal.estimated_recovery_days,
            PlanOrigin::Manual,
            now,
        );
        for alert in &alerts {
            plan = plan.addressing(alert.id);
        }
        self.storage.save_plan(&plan).await?;

        for mut alert in alerts {
            if alert.status == AlertStatus::Active {
                alert.mark_pending(now)?;
                self.storage.save_alert(&alert).await?;
            }
        }

        info!("{} proposed plan {} for {}", session.name, plan.id, plan.subject_id);
        Ok(plan)
    }

    /// Approve a proposed plan and resolve the alerts it addresses.
    pub async fn approve(&self, session: &Session, plan_id: PlanId, now: Time) -> Result<CatchUpPlan> {
        require_head(session, "approve plans")?;
        let mut plan = self.load_plan(plan_id).await?;
        let alerts = self.load_addressed(&plan).await?;
        plan.approve(session.user.clone(), now)?;
        self.storage.save_plan(&plan).await?;

        for mut alert in alerts {
            if alert.is_open() {
                alert.resolve(now)?;
                self.storage.save_alert(&alert).await?;
            }
        }

        info!("{} approved plan {}", session.name, plan.id);
        Ok(plan)
    }

    /// Reject a proposed plan. Addressed alerts that no other proposed plan
    /// covers become active again.
    pub async fn reject(&self, session: &Session, plan_id: PlanId, now: Time) -> Result<CatchUpPlan> {
        require_head(session, "reject plans")?;
        let mut plan = self.load_plan(plan_id).await?;
        let alerts = self.load_addressed(&plan).await?;
        let others: Vec<CatchUpPlan> = self
            .storage
            .list_plans(&PlanFilter {
                status: Some(vec![PlanStatus::Proposed]),
                subject: Some(plan.subject_id.clone()),
            })
            .await?
            .into_iter()
            .filter(|p| p.id != plan.id)
            .collect();
        plan.reject(session.user.clone(), now)?;
        self.storage.save_plan(&plan).await?;

        for mut alert in alerts {
            let covered = others.iter().any(|p| p.addresses.contains(&alert.id));
            if alert.status == AlertStatus::Pending && !covered {
                alert.reopen(now)?;
                self.storage.save_alert(&alert).await?;
            }
        }

        info!("{} rejected plan {}", session.name, plan.id);
        Ok(plan)
    }

    /// Edit a plan that is still proposed.
    pub async fn revise(
        &self,
        session: &Session,
        plan_id: PlanId,
        description: Option<String>,
        estimated_recovery_days: Option<u32>,
    ) -> Result<CatchUpPlan> {
        let mut plan = self.load_plan(plan_id).await?;
        if !session.is_head_of_department() && plan.faculty_id != session.user {
            return Err(InterventionError::Unauthorized {
                user: session.user.clone(),
                action: "revise this plan",
            });
        }
        if matches!(&description, Some(d) if d.trim().is_empty()) {
            return Err(InterventionError::MissingField("description"));
        }

        plan.revise(description, estimated_recovery_days)?;
        self.storage.save_plan(&plan).await?;
        info!("{} revised plan {}", session.name, plan.id);
        Ok(plan)
    }

    /// Resolve an alert directly.
    pub async fn resolve_alert(&self, session: &Session, alert_id: AlertId, now: Time) -> Result<Alert> {
        require_head(session, "resolve alerts")?;
        let mut alert = self.load_alert(alert_id).await?;
        alert.resolve(now)?;
        self.storage.save_alert(&alert).await?;
        info!("{} resolved alert {}", session.name, alert.id);
        Ok(alert)
    }

    /// Every alert the plan addresses; fails before any write if one is gone.
    async fn load_addressed(&self, plan: &CatchUpPlan) -> Result<Vec<Alert>> {
        let mut alerts = Vec::with_capacity(plan.addresses.len());
        for id in &plan.addresses {
            alerts.push(self.load_alert(*id).await?);
        }
        Ok(alerts)
    }

    async fn load_plan(&self, id: PlanId) -> Result<CatchUpPlan> {
        self.storage
            .load_plan(id)
            .await?
            .ok_or(InterventionError::PlanNotFound(id))
    }

    async fn load_alert(&self, id: AlertId) -> Result<Alert> {
        self.storage
            .load_alert(id)
            .await?
            .ok_or(InterventionError::AlertNotFound(id))
    }
}

fn require_head(session: &Session, action: &'static str) -> Result<()> {
    if session.is_head_of_department() {
        Ok(())
    } else {
        Err(InterventionError::Unauthorized {
            user: session.user.clone(),
            action,
        })
    }
}
