use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lesson_core::{parse_lesson_toml, EventOutcome, NamedLessonConfig, Transition};
use serde::Serialize;
use shared::{
    error::LessonFault,
    protocol::{LessonEvent, LessonSnapshot},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod session;
mod settings;

use session::{describe_outcome, mount, render, run_interactive};
use settings::{load_settings, resolve_lesson_path};

#[derive(Parser, Debug)]
#[command(name = "lesson_runner", about = "Drive lesson-step screens from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate a lesson file.
    Check { lesson: String },
    /// Work through a lesson interactively.
    Run { lesson: String },
    /// Apply a JSON array of lesson events and print the final state.
    Replay { lesson: String, events: PathBuf },
    /// Step through the phases automatically.
    Autoplay {
        lesson: String,
        /// Delay between phases in milliseconds (overrides settings).
        #[arg(long)]
        step_ms: Option<u64>,
    },
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    applied: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fault: Option<LessonFault>,
    completed: bool,
    snapshot: LessonSnapshot,
}

fn load_lesson(path: &Path) -> Result<NamedLessonConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read lesson file '{}'", path.display()))?;
    parse_lesson_toml(&raw).with_context(|| format!("invalid lesson '{}'", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = load_settings()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { lesson } => {
            let path = resolve_lesson_path(&settings, &lesson);
            let config = load_lesson(&path)?;
            let phases: Vec<String> = config.phases.iter().map(|p| p.name.to_string()).collect();
            println!("{}: ok", path.display());
            println!("  title: {}", config.title);
            println!("  phases: {}", phases.join(" -> "));
            println!(
                "  examples: {} ({} graded)",
                config.examples.len(),
                config.problem_count()
            );
            if config.completion.is_empty() {
                println!("  completion: last phase reached");
            } else {
                let rules: Vec<String> = config.completion.iter().map(|r| r.to_string()).collect();
                println!("  completion: {}", rules.join(" and "));
            }
        }
        Command::Run { lesson } => {
            let path = resolve_lesson_path(&settings, &lesson);
            let mut host = mount(load_lesson(&path)?)?;
            info!(lesson = %path.display(), mount = %host.controller().mount_id(), "interactive session started");
            run_interactive(&mut host, io::stdin().lock(), io::stdout())?;
        }
        Command::Replay { lesson, events } => {
            let path = resolve_lesson_path(&settings, &lesson);
            let mut host = mount(load_lesson(&path)?)?;
            let raw = fs::read_to_string(&events)
                .with_context(|| format!("failed to read events file '{}'", events.display()))?;
            let events: Vec<LessonEvent> =
                serde_json::from_str(&raw).context("events file is not a JSON array of lesson events")?;

            let mut applied = 0;
            let mut fault = None;
            for event in events {
                match host.apply(event) {
                    Ok(_) => applied += 1,
                    Err(err) => {
                        fault = Some(LessonFault::from(&err));
                        break;
                    }
                }
            }

            let report = ReplayReport {
                applied,
                fault,
                completed: host.has_completed(),
                snapshot: host.snapshot(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Autoplay { lesson, step_ms } => {
            let path = resolve_lesson_path(&settings, &lesson);
            let mut host = mount(load_lesson(&path)?)?;
            let interval = Duration::from_millis(step_ms.unwrap_or(settings.autoplay_step_ms));
            let remaining = host.controller().phases().phases().len() - 1;

            println!("{}", render(&host));
            host.schedule()
                .schedule_sequence(interval, (0..remaining).map(|_| LessonEvent::NextPhase));

            while let Some(applied) = host.next_scheduled().await {
                let outcome = applied?;
                println!("{}", describe_outcome(&outcome));
                if let EventOutcome::Phase(Transition::Blocked { .. }) = outcome {
                    host.cancel_scheduled();
                    break;
                }
                println!("{}", render(&host));
            }
        }
    }

    Ok(())
}
