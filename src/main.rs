// src/main.rs
//! Review pipeline binary entrypoint.
//!
//! Loads configuration, wires the built-in model backends, and runs the
//! batch. See `README.md` for the expected data layout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use moviehub_review_pipeline::config::{self, PipelineConfig};
use moviehub_review_pipeline::model::{ExtractiveSummarizer, LexiconClassifier};
use moviehub_review_pipeline::pipeline::{MoviePipeline, RunSummary};

#[derive(Parser, Debug)]
#[command(
    name = "moviehub-review-pipeline",
    about = "Aggregate scraped movie reviews into predicted ratings and synopses"
)]
struct Cli {
    /// Path to the pipeline TOML config
    #[arg(long, env = config::ENV_PIPELINE_CONFIG_PATH, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process the full plan, resuming from a checkpoint when present
    Run {
        /// Discard any recorded progress and start from scratch
        #[arg(long, default_value_t = false)]
        fresh: bool,
    },
    /// Process only the first N planned movies into the sample output file
    Sample {
        /// How many movies to process
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn log_summary(summary: &RunSummary) {
    info!(
        planned = summary.planned,
        processed = summary.processed,
        skipped = summary.skipped,
        missing_reviews = summary.missing_reviews,
        degraded = summary.degraded,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "finished"
    );
}

fn main() -> Result<()> {
    // .env first: clap env-backed args and config loading both read it
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    let cfg = match &cli.config {
        Some(path) => PipelineConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PipelineConfig::load().context("failed to load config")?,
    };

    let mut pipeline = MoviePipeline::new(
        cfg,
        Arc::new(LexiconClassifier::new()),
        Arc::new(ExtractiveSummarizer::new()),
    );

    match cli.command {
        Command::Run { fresh } => {
            if fresh {
                pipeline
                    .discard_checkpoint()
                    .context("failed to discard checkpoint")?;
                info!("checkpoint discarded; starting fresh");
            }
            let summary = pipeline.run().context("pipeline run failed")?;
            log_summary(&summary);
        }
        Command::Sample { count } => {
            let summary = pipeline.sample(count).context("sample run failed")?;
            log_summary(&summary);
        }
    }
    Ok(())
}
