//! diyplan CLI - DIY Project Scheduling Engine
//!
//! Command-line interface for validating scheduling requests, computing
//! draft schedules, previewing remediations and committing a schedule.

mod output;
mod sink;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use diyplan_core::{MemorySink, ScheduleSink, SchedulingInputs};
use diyplan_solver::{EngineConfig, ScheduleManager};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::output::{render_remediations, render_schedule};
use crate::sink::JsonFileSink;

#[derive(Parser)]
#[command(name = "diyplan")]
#[command(author, version, about = "DIY project scheduling engine", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine settings file (TOML)
    #[arg(short, long, env = "DIYPLAN_CONFIG", global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scheduling request
    Check {
        /// Input file path (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Compute a draft schedule
    Schedule {
        /// Input file path (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Commit the draft to this file
        #[arg(long, value_name = "FILE")]
        commit: Option<PathBuf>,
    },

    /// Compute a draft and preview ways to clear its conflicts
    Remediate {
        /// Input file path (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Check { file }) => cmd_check(&file),
        Some(Commands::Schedule {
            file,
            format,
            output,
            commit,
        }) => cmd_schedule(&file, format, output.as_deref(), commit, config),
        Some(Commands::Remediate { file, format }) => cmd_remediate(&file, format, config),
        None => {
            println!("diyplan - DIY Project Scheduling Engine");
            println!("Run with --help for usage information");
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = toml::from_str(&raw)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    debug!(path = %path.display(), "loaded engine config");
    Ok(config)
}

fn load_inputs(path: &Path) -> Result<SchedulingInputs> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid scheduling request: {}", path.display()))
}

fn cmd_check(file: &Path) -> Result<()> {
    let inputs = load_inputs(file)?;
    diyplan_solver::validate(&inputs)
        .with_context(|| format!("Validation failed: {}", file.display()))?;

    println!(
        "OK: {} tasks, {} workers ({})",
        inputs.tasks.len(),
        inputs.workers.len(),
        inputs.timezone
    );
    Ok(())
}

fn cmd_schedule(
    file: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    commit: Option<PathBuf>,
    config: EngineConfig,
) -> Result<()> {
    let inputs = load_inputs(file)?;
    match commit {
        Some(path) => {
            let manager = ScheduleManager::with_config(JsonFileSink::new(&path), config);
            schedule(manager, &inputs, file, format, output, true)?;
            eprintln!("Committed: {}", path.display());
            Ok(())
        }
        None => {
            let manager = ScheduleManager::with_config(MemorySink::new(), config);
            schedule(manager, &inputs, file, format, output, false)
        }
    }
}

fn schedule<S: ScheduleSink>(
    mut manager: ScheduleManager<S>,
    inputs: &SchedulingInputs,
    file: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    commit: bool,
) -> Result<()> {
    let graph = diyplan_solver::validate(inputs)
        .with_context(|| format!("Scheduling failed: {}", file.display()))?;
    let draft = manager
        .compute(inputs)
        .with_context(|| format!("Scheduling failed: {}", file.display()))?;

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&draft)?,
        OutputFormat::Text => render_schedule(&draft, &graph)?,
    };
    emit(&rendered, output)?;

    if commit {
        manager.commit(&draft).context("Commit failed")?;
    }
    Ok(())
}

fn cmd_remediate(file: &Path, format: OutputFormat, config: EngineConfig) -> Result<()> {
    let inputs = load_inputs(file)?;
    let mut manager = ScheduleManager::with_config(MemorySink::new(), config);
    let draft = manager
        .compute(&inputs)
        .with_context(|| format!("Scheduling failed: {}", file.display()))?;
    let suggestions = manager.suggest_remediations(&inputs, &draft)?;

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&suggestions)?,
        OutputFormat::Text => render_remediations(&draft, &suggestions)?,
    };
    emit(&rendered, None)
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            eprintln!("Written: {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
