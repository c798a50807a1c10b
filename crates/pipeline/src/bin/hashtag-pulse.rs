use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pulse_core::{Config, TracingReporter};
use pulse_pipeline::Pipeline;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "hashtag-pulse",
    about = "Turn collected hashtag posts into a windowed composite signal"
)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Load the newest raw batch and write curated Parquet partitions.
    Process {
        /// Process this batch directory instead of the newest one.
        #[arg(long, value_name = "DIR")]
        batch: Option<PathBuf>,
    },
    /// Compute the windowed signal from the curated dataset.
    Analyze,
    /// Process, then analyze.
    Run,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    let reporter = TracingReporter;

    match cli.command {
        CliCommand::Process { batch } => {
            let summary = match batch {
                Some(dir) => pipeline.process_batch(&dir, &reporter),
                None => pipeline.process(&reporter),
            }
            .context("process stage failed")?;
            info!(rows = summary.rows, "done");
        }
        CliCommand::Analyze => {
            let summary = pipeline.analyze(&reporter).context("analyze stage failed")?;
            info!(
                records = summary.records,
                windows = summary.windows.len(),
                "done"
            );
        }
        CliCommand::Run => {
            let summary = pipeline.run(&reporter).context("pipeline run failed")?;
            info!(
                records = summary.records,
                windows = summary.windows.len(),
                "done"
            );
        }
    }
    Ok(())
}
