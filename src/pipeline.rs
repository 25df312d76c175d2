// src/pipeline.rs
//! # Movie Pipeline Orchestrator
//!
//! Drives the whole batch: plan from genre files, per-movie review loading,
//! both engines, metadata merge, CSV output, checkpointing. Strictly
//! sequential; the only suspension points are model calls, which may be slow
//! and are treated as blocking.
//!
//! Failure policy: anything scoped to a single movie (missing file, bad CSV,
//! model failure) degrades that movie's row and the loop continues. Losing
//! track of progress is the one unacceptable failure, so checkpoint and
//! output write errors abort the run.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::config::PipelineConfig;
use crate::error::{PersistenceError, PipelineError};
use crate::metadata::{GenreFile, MovieCatalog, MovieMeta, PlannedMovie};
use crate::model::{DynSentimentModel, DynSummaryModel};
use crate::output::{ResultRow, ResultWriter};
use crate::sentiment::SentimentAggregator;
use crate::store::ReviewStore;
use crate::synopsis::{SynopsisGenerator, SYNOPSIS_UNAVAILABLE};

/// One-time metrics registration (so an installed recorder exports
/// described series).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "pipeline_movies_processed_total",
            "Movies with an output row written."
        );
        describe_counter!(
            "pipeline_movies_skipped_total",
            "Plan rows skipped because the title was already processed."
        );
        describe_counter!(
            "pipeline_movies_missing_reviews_total",
            "Movies with no usable review file."
        );
        describe_counter!(
            "pipeline_engine_degraded_total",
            "Movies where at least one engine fell back."
        );
        describe_counter!(
            "pipeline_reviews_loaded_total",
            "Raw reviews loaded from the store."
        );
        describe_histogram!(
            "pipeline_movie_process_ms",
            "Per-movie processing time in milliseconds."
        );
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when a pipeline run last finished."
        );
    });
}

/// Where a run currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    InProgress { genre_file: String, row: usize },
    FileComplete { genre_file: String },
    AllComplete,
}

/// Counters for a completed run. `planned` spans the whole plan; the other
/// counts cover this run only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub planned: usize,
    pub processed: usize,
    pub skipped: usize,
    pub missing_reviews: usize,
    pub degraded: usize,
    pub elapsed: Duration,
}

pub struct MoviePipeline {
    cfg: PipelineConfig,
    store: ReviewStore,
    aggregator: SentimentAggregator,
    synopsizer: SynopsisGenerator,
    checkpoints: CheckpointStore,
    state: RunState,
}

impl MoviePipeline {
    pub fn new(
        cfg: PipelineConfig,
        sentiment: DynSentimentModel,
        summary: DynSummaryModel,
    ) -> Self {
        let store = ReviewStore::new(&cfg.paths.reviews_dir);
        let aggregator = SentimentAggregator::new(sentiment, cfg.sentiment.clone());
        let synopsizer = SynopsisGenerator::new(summary, cfg.synopsis.clone());
        let checkpoints = CheckpointStore::new(&cfg.paths.checkpoint_file);
        Self {
            cfg,
            store,
            aggregator,
            synopsizer,
            checkpoints,
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Drop recorded progress so the next run starts from scratch.
    pub fn discard_checkpoint(&self) -> Result<(), PipelineError> {
        self.checkpoints.clear()?;
        Ok(())
    }

    /// Process the full plan, resuming from the checkpoint if one exists.
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        ensure_metrics_described();
        let started = Instant::now();
        let catalog = MovieCatalog::load(
            &self.cfg.paths.genre_dir,
            self.cfg.paths.details_file.as_deref(),
        )?;

        let (start_file, start_row, mut processed) = match self.checkpoints.load()? {
            Some(cp) => match catalog.plan.iter().position(|f| f.file_name == cp.genre_file) {
                Some(idx) => {
                    info!(
                        genre_file = cp.genre_file,
                        row = cp.row,
                        processed = cp.processed.len(),
                        "resuming from checkpoint"
                    );
                    (idx, cp.row, cp.processed)
                }
                None => {
                    warn!(
                        genre_file = cp.genre_file,
                        "checkpointed file not in plan; starting fresh"
                    );
                    (0, 0, BTreeSet::new())
                }
            },
            None => (0, 0, BTreeSet::new()),
        };

        let resuming = start_file > 0 || start_row > 0 || !processed.is_empty();
        let mut writer = if resuming {
            ResultWriter::append(&self.cfg.paths.output_file)?
        } else {
            ResultWriter::create(&self.cfg.paths.output_file)?
        };

        let mut summary = RunSummary {
            planned: catalog.planned_rows(),
            ..Default::default()
        };

        for (file_idx, genre_file) in catalog.plan.iter().enumerate().skip(start_file) {
            let first_row = if file_idx == start_file { start_row } else { 0 };
            info!(
                genre_file = genre_file.file_name,
                movies = genre_file.rows.len(),
                first_row,
                "processing genre file"
            );

            for (row_idx, movie) in genre_file.rows.iter().enumerate().skip(first_row) {
                self.state = RunState::InProgress {
                    genre_file: genre_file.file_name.clone(),
                    row: row_idx,
                };

                if processed.contains(&movie.title) {
                    summary.skipped += 1;
                    counter!("pipeline_movies_skipped_total").increment(1);
                    self.save_progress(&genre_file.file_name, row_idx + 1, &processed)?;
                    continue;
                }

                let movie_started = Instant::now();
                let row = self.process_movie(&catalog, genre_file, movie, &mut summary);
                writer.write_row(&row)?;
                processed.insert(movie.title.clone());
                summary.processed += 1;
                counter!("pipeline_movies_processed_total").increment(1);
                histogram!("pipeline_movie_process_ms")
                    .record(movie_started.elapsed().as_secs_f64() * 1000.0);

                // the row is flushed; advancing the checkpoint is now safe
                self.save_progress(&genre_file.file_name, row_idx + 1, &processed)?;
            }

            self.state = RunState::FileComplete {
                genre_file: genre_file.file_name.clone(),
            };
            if let Some(next) = catalog.plan.get(file_idx + 1) {
                self.save_progress(&next.file_name, 0, &processed)?;
            }
        }

        self.checkpoints.clear()?;
        self.state = RunState::AllComplete;
        summary.elapsed = started.elapsed();
        gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        info!(
            planned = summary.planned,
            processed = summary.processed,
            skipped = summary.skipped,
            missing_reviews = summary.missing_reviews,
            degraded = summary.degraded,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "pipeline run complete"
        );
        Ok(summary)
    }

    /// Process only the first `count` distinct planned movies into the
    /// sample output path. Never touches the checkpoint.
    pub fn sample(&mut self, count: usize) -> Result<RunSummary, PipelineError> {
        ensure_metrics_described();
        let started = Instant::now();
        let catalog = MovieCatalog::load(
            &self.cfg.paths.genre_dir,
            self.cfg.paths.details_file.as_deref(),
        )?;

        let mut writer = ResultWriter::create(&self.cfg.paths.sample_output_file)?;
        let mut summary = RunSummary {
            planned: count.min(catalog.movie_count()),
            ..Default::default()
        };
        let mut seen: BTreeSet<String> = BTreeSet::new();

        'plan: for genre_file in &catalog.plan {
            for movie in &genre_file.rows {
                if summary.processed >= count {
                    break 'plan;
                }
                if !seen.insert(movie.title.clone()) {
                    summary.skipped += 1;
                    continue;
                }
                let row = self.process_movie(&catalog, genre_file, movie, &mut summary);
                writer.write_row(&row)?;
                summary.processed += 1;
            }
        }

        summary.elapsed = started.elapsed();
        info!(
            processed = summary.processed,
            output = %self.cfg.paths.sample_output_file.display(),
            "sample run complete"
        );
        Ok(summary)
    }

    /// One movie, never fails: every error path degrades to a placeholder
    /// value in the returned row.
    fn process_movie(
        &self,
        catalog: &MovieCatalog,
        genre_file: &GenreFile,
        movie: &PlannedMovie,
        summary: &mut RunSummary,
    ) -> ResultRow {
        let fallback_meta = MovieMeta::default();
        let meta = catalog.meta(&movie.title).unwrap_or(&fallback_meta);

        let reviews = self.load_reviews_for(movie, &genre_file.name);
        let (rating, synopsis, degraded) = if reviews.is_empty() {
            summary.missing_reviews += 1;
            counter!("pipeline_movies_missing_reviews_total").increment(1);
            (0.0, SYNOPSIS_UNAVAILABLE.to_string(), true)
        } else {
            counter!("pipeline_reviews_loaded_total").increment(reviews.len() as u64);
            // engines run independently; one failing never blocks the other
            let rating = self.aggregator.predict_rating(reviews.iter());
            let synopsis = self.synopsizer.generate(reviews.iter());
            (
                rating.rating,
                synopsis.text,
                rating.degraded || synopsis.degraded,
            )
        };
        if degraded {
            summary.degraded += 1;
            counter!("pipeline_engine_degraded_total").increment(1);
        }

        ResultRow {
            title: movie.title.clone(),
            predicted_rating: rating,
            genre: meta.genre_label(),
            synopsis,
            num_reviews: reviews.len(),
            movie_length: meta.run_length.clone(),
            release_year: meta.release_year_label(),
        }
    }

    fn load_reviews_for(&self, movie: &PlannedMovie, genre: &str) -> Vec<String> {
        match self
            .store
            .load_for_title(&movie.title, movie.year, Some(genre))
        {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!(title = movie.title, error = %e, "writing degraded row");
                Vec::new()
            }
        }
    }

    fn save_progress(
        &self,
        genre_file: &str,
        row: usize,
        processed: &BTreeSet<String>,
    ) -> Result<(), PersistenceError> {
        self.checkpoints
            .save(&Checkpoint::new(genre_file, row, processed.clone()))
    }
}
