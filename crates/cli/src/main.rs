//! Goalpost CLI - goal progress from logged observations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use goalpost_core::{GoalId, TrackerId};
use goalpost_progress::{report, summarize, EngineConfig, GoalSummary};
use goalpost_storage::{JsonStorage, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "goalpost")]
#[command(about = "Goal progress from logged observations", long_about = None)]
struct Cli {
    /// Storage directory
    #[arg(long, global = true, default_value = ".goalpost")]
    store: PathBuf,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the completion summary of a goal
    Summary {
        /// Goal ID
        goal: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// One line per stored goal
    Status,
    /// Record an observation for a tracker
    Log {
        /// Goal ID
        goal: String,
        /// Tracker ID
        tracker: String,
        /// Observation date (YYYY-MM-DD)
        date: NaiveDate,
        /// Observed value
        value: f64,
    },
    /// Show every tracker of a goal
    Show {
        /// Goal ID
        goal: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = EngineConfig {
        as_of: cli.as_of,
        ..EngineConfig::default()
    }
    .pinned();

    let mut storage = JsonStorage::new(&cli.store)
        .await
        .with_context(|| format!("opening store {}", cli.store.display()))?
        .with_config(config);

    match cli.command {
        Commands::Summary { goal, json } => {
            let goal = load(&storage, &goal).await?;
            let summary = summarize(&goal, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
        Commands::Status => {
            let goals = storage.list_goals().await?;
            println!("Goals ({}) as of {}", goals.len(), config.today());
            for goal in goals {
                match summarize(&goal, &config) {
                    Ok(s) => println!(
                        "  {} | {:>5.1}% | {}/{} | {}",
                        goal.id, s.percent_complete * 100.0, s.completed_count, s.total_count, goal.what,
                    ),
                    Err(e) => println!("  {} | invalid: {}", goal.id, e),
                }
            }
        }
        Commands::Log { goal, tracker, date, value } => {
            let updated = storage
                .append_log(&GoalId::new(goal), &TrackerId::new(tracker.as_str()), date, value)
                .await?;
            info!(goal = %updated.id, tracker = %tracker, %date, value, "logged");

            let summary = summarize(&updated, &config)?;
            print_summary(&summary);
        }
        Commands::Show { goal } => {
            let goal = load(&storage, &goal).await?;
            println!("Goal: {}", goal.id);
            println!("  What: {}", goal.what);
            println!("  When: {}", goal.when);
            println!("  Why:  {}", goal.why);
            for milestone in &goal.milestones {
                println!("  Milestone {} [{}]: {}", milestone.id, milestone.status, milestone.statement);
                for tracker in &milestone.trackers {
                    let r = report(tracker, &config);
                    let value = r
                        .current_value
                        .map(|v| format!("{v} {}", tracker.unit).trim_end().to_string())
                        .unwrap_or_else(|| "-".into());
                    let ratio = r
                        .progress_ratio
                        .map(|p| format!(" ({:.0}%)", p * 100.0))
                        .unwrap_or_default();
                    println!(
                        "    {} = {}{} | {} | streak {} | met {}",
                        tracker.id,
                        value,
                        ratio,
                        if r.satisfied { "satisfied" } else { "open" },
                        r.trailing_streak,
                        r.met_entries,
                    );
                }
            }
        }
    }

    Ok(())
}

async fn load(storage: &JsonStorage, id: &str) -> Result<goalpost_core::Goal> {
    storage
        .load_goal(&GoalId::new(id))
        .await?
        .with_context(|| format!("goal {id} not found"))
}

fn print_summary(s: &GoalSummary) {
    println!("Goal {}: {:.1}% complete", s.goal, s.percent_complete * 100.0);
    println!("  Completed: {}/{}", s.completed_count, s.total_count);
    if s.archived_count > 0 {
        println!("  Archived:  {}", s.archived_count);
    }
    println!("  Next:      {}", join(&s.next_actionable));
    if !s.blocked.is_empty() {
        println!("  Blocked:   {}", join(&s.blocked));
    }
}

fn join(ids: &[goalpost_core::MilestoneId]) -> String {
    if ids.is_empty() {
        return "-".into();
    }
    ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
}
