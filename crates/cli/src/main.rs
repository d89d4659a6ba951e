//! SyllabusSync CLI - syllabus progress tracking and interventions.

mod config;
mod import;

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use syllabus_core::{
    Alert, AlertId, AlertStatus, CatchUpPlan, FacultyId, PlanId, PlanStatus, SubjectId,
    TopicId, UnitId,
};
use syllabus_intervention::{InterventionEngine, PlanService, Proposal};
use syllabus_progress::{
    BasicProgressTracker, ProgressTracker, ReportBuilder, SubjectStatus, TopicLedger,
};
use syllabus_storage::{AlertFilter, JsonStorage, PlanFilter, Storage};
use tracing::info;

use crate::config::SyncConfig;

#[derive(Parser)]
#[command(name = "syllabus-sync")]
#[command(about = "Syllabus progress tracking and intervention engine", long_about = None)]
struct Cli {
    /// Data directory
    #[arg(long, global = true, default_value = ".syllabus")]
    data: PathBuf,

    /// Config file (defaults to <data>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Acting user id
    #[arg(long = "as", global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import faculty and subjects from a JSON file
    Import {
        /// File to import
        file: PathBuf,
    },
    /// Show subject progress
    Progress {
        /// Subject id (all subjects when omitted)
        subject: Option<String>,
    },
    /// Quick-log topics of one unit as taught
    Log {
        /// Subject id
        subject: String,
        /// Unit id
        unit: String,
        /// Topic ids
        topics: Vec<String>,
    },
    /// Mark one topic complete
    Toggle {
        /// Subject id
        subject: String,
        /// Topic id
        topic: String,
        /// Mark incomplete instead
        #[arg(long)]
        undo: bool,
    },
    /// Evaluate intervention rules
    Scan {
        /// Show findings without recording alerts
        #[arg(long)]
        dry_run: bool,
    },
    /// List alerts
    Alerts {
        /// Include resolved alerts
        #[arg(long)]
        all: bool,
    },
    /// Resolve an alert
    Resolve {
        /// Alert ID
        alert: String,
    },
    /// List catch-up plans
    Plans {
        /// Only plans in this state
        #[arg(long)]
        status: Option<String>,
    },
    /// Propose a catch-up plan
    Propose {
        /// Subject id
        subject: String,
        /// Remediation description
        description: String,
        /// Estimated recovery in days
        #[arg(long)]
        days: u32,
        /// Alerts the plan addresses
        #[arg(long = "alert")]
        alerts: Vec<String>,
    },
    /// Approve a proposed plan
    Approve {
        /// Plan ID
        plan: String,
    },
    /// Reject a proposed plan
    Reject {
        /// Plan ID
        plan: String,
    },
    /// Revise a proposed plan
    Revise {
        /// Plan ID
        plan: String,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New recovery estimate in days
        #[arg(long)]
        days: Option<u32>,
    },
    /// Department overview
    Overview,
    /// Write a JSON report
    Report {
        /// Report kind
        kind: ReportKind,
        /// Faculty for a faculty report (defaults to --as)
        #[arg(long)]
        faculty: Option<String>,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKind {
    Department,
    Faculty,
    Intervention,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(|| cli.data.join("config.json"));
    let config = SyncConfig::load(&config_path)?;

    // Open storage
    let storage: Arc<dyn Storage> = Arc::new(JsonStorage::new(&cli.data).await?);
    let tracker = BasicProgressTracker::new(storage.clone(), config.term, config.velocity);
    let now = Utc::now();

    match cli.command {
        Commands::Import { file } => {
            let summary = import::import_file(storage.as_ref(), &file).await?;
            println!(
                "Imported {} faculty, {} subjects ({} warnings)",
                summary.faculty, summary.subjects, summary.warnings
            );
        }
        Commands::Progress { subject } => match subject {
            Some(id) => {
                let status = tracker.subject_status(&SubjectId::new(id), now).await?;
                print_subject(&status, true);
            }
            None => {
                let snapshot = tracker.snapshot(now).await?;
                println!("Subjects ({})", snapshot.subjects.len());
                for status in &snapshot.subjects {
                    print_subject(status, false);
                }
            }
        },
        Commands::Log { subject, unit, topics } => {
            let session = config.session(storage.as_ref(), cli.user.as_deref()).await?;
            let topics: Vec<TopicId> = topics.into_iter().map(TopicId::new).collect();
            let receipt = TopicLedger::new(storage.clone())
                .log_topics(&session, &SubjectId::new(subject), &UnitId::new(unit), &topics, now)
                .await?;
            println!("{} topics marked as completed", receipt.newly_completed.len());
            if !receipt.already_completed.is_empty() {
                println!("Already completed: {}", join(&receipt.already_completed));
            }
        }
        Commands::Toggle { subject, topic, undo } => {
            let session = config.session(storage.as_ref(), cli.user.as_deref()).await?;
            let changed = TopicLedger::new(storage.clone())
                .set_completion(&session, &SubjectId::new(subject), &TopicId::new(&topic), !undo, now)
                .await?;
            let state = if undo { "incomplete" } else { "complete" };
            if changed {
                println!("Marked {} {}", topic, state);
            } else {
                println!("{} already {}", topic, state);
            }
        }
        Commands::Scan { dry_run } => {
            let engine = InterventionEngine::new(storage.clone(), tracker, config.thresholds, config.alerts);
            if dry_run {
                let findings = engine.evaluate(now).await?;
                println!("Findings ({})", findings.len());
                for f in &findings {
                    println!(
                        "  {} | {} | {} - {}",
                        f.alert_type.as_str(),
                        f.severity.as_str(),
                        f.subject_id,
                        f.description
                    );
                }
            } else {
                let report = engine.scan(now).await?;
                if !report.persisted {
                    println!("Automated alerts are disabled; {} findings not recorded", report.findings.len());
                } else {
                    println!(
                        "Scan: {} new, {} updated, {} unchanged, {} plans suggested",
                        report.created.len(),
                        report.updated.len(),
                        report.unchanged.len(),
                        report.suggested.len()
                    );
                }
            }
        }
        Commands::Alerts { all } => {
            let filter = if all { AlertFilter::default() } else { AlertFilter::open() };
            let alerts = storage.list_alerts(&filter).await?;
            println!("Alerts ({})", alerts.len());
            for alert in &alerts {
                print_alert(alert);
            }
        }
        Commands::Resolve { alert } => {
            let session = config.session(storage.as_ref(), cli.user.as_deref()).await?;
            let alert = PlanService::new(storage.clone())
                .resolve_alert(&session, parse_alert_id(&alert)?, now)
                .await?;
            println!("Resolved alert {}", alert.id);
        }
        Commands::Plans { status } => {
            let filter = PlanFilter {
                status: status.map(|s| parse_plan_status(&s)).transpose()?.map(|s| vec![s]),
                ..Default::default()
            };
            let plans = storage.list_plans(&filter).await?;
            println!("Plans ({})", plans.len());
            for plan in &plans {
                print_plan(plan);
            }
        }
        Commands::Propose { subject, description, days, alerts } => {
            let session = config.session(storage.as_ref(), cli.user.as_deref()).await?;
            let alerts = alerts
                .iter()
                .map(|a| parse_alert_id(a))
                .collect::<Result<Vec<_>>>()?;
            let plan = PlanService::new(storage.clone())
                .propose(
                    &session,
                    Proposal {
                        subject_id: SubjectId::new(subject),
                        description,
                        estimated_recovery_days: days,
                        alerts,
                    },
                    now,
                )
                .await?;
            println!("Proposed plan {}", plan.id);
        }
        Commands::Approve { plan } => {
            let session = config.session(storage.as_ref(), cli.user.as_deref()).await?;
            let plan = PlanService::new(storage.clone())
                .approve(&session, parse_plan_id(&plan)?, now)
                .await?;
            println!("Approved plan {} ({} alerts resolved)", plan.id, plan.addresses.len());
        }
        Commands::Reject { plan } => {
            let session = config.session(storage.as_ref(), cli.user.as_deref()).await?;
            let plan = PlanService::new(storage.clone())
                .reject(&session, parse_plan_id(&plan)?, now)
                .await?;
            println!("Rejected plan {}", plan.id);
        }
        Commands::Revise { plan, description, days } => {
            if description.is_none() && days.is_none() {
                bail!("Nothing to revise: pass --description and/or --days");
            }
            let session = config.session(storage.as_ref(), cli.user.as_deref()).await?;
            let plan = PlanService::new(storage.clone())
                .revise(&session, parse_plan_id(&plan)?, description, days)
                .await?;
            print_plan(&plan);
        }
        Commands::Overview => {
            let report = ReportBuilder::new(storage.clone(), tracker, config.velocity.tolerance)
                .department(now)
                .await?;
            let stats = &report.stats;
            println!("Department Overview");
            println!("  Faculty: {}", stats.total_faculty);
            println!("  Subjects: {}", stats.total_subjects);
            println!("  Average progress: {}%", stats.average_progress);
            println!(
                "  Ahead: {}  On track: {}  Delayed: {}",
                stats.ahead, stats.on_track, stats.delayed
            );
            println!();
            for row in &report.faculty {
                println!(
                    "  {} | {}% | {} | {}",
                    row.name,
                    row.average_progress,
                    row.status.as_str(),
                    row.last_update
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "never".to_string())
                );
                println!("      {}", row.subjects.join(", "));
            }
            println!();
            println!("Faculty Comparison");
            for c in &report.comparison {
                println!(
                    "  {} | {} subjects | {}/{} topics | {} last week | {:?}",
                    c.name, c.subjects, c.topics_completed, c.total_topics, c.completed_last_week, c.trend
                );
            }
        }
        Commands::Report { kind, faculty, output } => {
            let builder = ReportBuilder::new(storage.clone(), tracker, config.velocity.tolerance);
            let json = match kind {
                ReportKind::Department => serde_json::to_string_pretty(&builder.department(now).await?)?,
                ReportKind::Faculty => {
                    let id = faculty
                        .or(cli.user)
                        .context("A faculty report needs --faculty or --as")?;
                    serde_json::to_string_pretty(&builder.faculty(&FacultyId::new(id), now).await?)?
                }
                ReportKind::Intervention => {
                    serde_json::to_string_pretty(&builder.intervention(now).await?)?
                }
            };
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Report written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

fn parse_alert_id(s: &str) -> Result<AlertId> {
    s.parse().map_err(|_| anyhow!("Invalid alert ID: {}", s))
}

fn parse_plan_id(s: &str) -> Result<PlanId> {
    s.parse().map_err(|_| anyhow!("Invalid plan ID: {}", s))
}

fn parse_plan_status(s: &str) -> Result<PlanStatus> {
    match s.to_lowercase().as_str() {
        "proposed" => Ok(PlanStatus::Proposed),
        "approved" => Ok(PlanStatus::Approved),
        "rejected" => Ok(PlanStatus::Rejected),
        _ => bail!("Unknown plan status: {}", s),
    }
}

fn print_subject(status: &SubjectStatus, detailed: bool) {
    let p = &status.progress;
    println!(
        "  {} {} | {}% (expected {}%) | {} | {}/{} topics",
        p.code,
        p.name,
        p.percentage,
        status.expected,
        status.velocity.as_str(),
        p.completed_topics,
        p.total_topics
    );
    if !detailed {
        return;
    }
    for unit in &p.units {
        println!(
            "    {} {} | {}% | {}",
            unit.unit_id,
            unit.name,
            unit.percentage,
            unit.status.as_str()
        );
        for issue in &unit.issues {
            println!("      ! {:?}", issue);
        }
    }
    println!(
        "  This week: {} topics, last week: {}",
        status.weekly.this_week, status.weekly.last_week
    );
    match status.projected_completion {
        Some(at) => println!("  Projected completion: {}", at.format("%Y-%m-%d")),
        None => println!("  Projected completion: unknown (no recent completions)"),
    }
}

fn print_alert(alert: &Alert) {
    let status = match alert.status {
        AlertStatus::Active => "ACTIVE",
        AlertStatus::Pending => "PENDING",
        AlertStatus::Resolved => "RESOLVED",
    };
    println!(
        "  {} | {} | {} | {} | {} - {}",
        alert.id,
        status,
        alert.severity.as_str(),
        alert.alert_type.as_str(),
        alert.subject_id,
        alert.description
    );
}

fn print_plan(plan: &CatchUpPlan) {
    println!(
        "  {} | {} | {} | {} days - {}",
        plan.id,
        plan.status.as_str().to_uppercase(),
        plan.subject_id,
        plan.estimated_recovery_days,
        plan.description
    );
}

fn join(ids: &[TopicId]) -> String {
    ids.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}
