// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod sentiment;
pub mod store;
pub mod synopsis;

// Model boundary: traits plus the built-in lexicon/extractive backends and
// the mock implementations tests plug in.
pub mod model;

// ---- Re-exports for stable public API ----
pub use crate::config::PipelineConfig;
pub use crate::error::{InputError, ModelError, PersistenceError, PipelineError};
pub use crate::model::{
    DynSentimentModel, DynSummaryModel, ExtractiveSummarizer, LexiconClassifier, SentimentModel,
    SummaryModel,
};
pub use crate::output::ResultRow;
pub use crate::pipeline::{MoviePipeline, RunState, RunSummary};
pub use crate::sentiment::{RatingOutcome, SentimentAggregator};
pub use crate::synopsis::{
    SynopsisGenerator, SynopsisOutcome, SYNOPSIS_INSUFFICIENT, SYNOPSIS_SYSTEM_ERROR,
    SYNOPSIS_UNAVAILABLE,
};
