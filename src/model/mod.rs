// src/model/mod.rs
//! Model boundary: the two black-box capabilities the pipeline depends on.
//!
//! Both traits are object-safe and `Send + Sync`; the orchestrator constructs
//! one implementation of each at startup and passes them down as dependencies,
//! so tests can substitute scripted or failing stand-ins. Implementations must
//! be deterministic: identical input yields identical output (no sampling).

pub mod extractive;
pub mod lexicon;
pub mod mock;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

pub use extractive::ExtractiveSummarizer;
pub use lexicon::LexiconClassifier;

/// Default maximum whitespace-token input length a summary model accepts.
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 1024;

/// Per-review classifier output: label → confidence in [0, 1].
/// Labels are lowercased on insert; scores need not sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelScores {
    scores: HashMap<String, f32>,
}

impl LabelScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for the common two-label shape.
    pub fn from_polarity(positive: f32, negative: f32) -> Self {
        let mut s = Self::new();
        s.insert("positive", positive);
        s.insert("negative", negative);
        s
    }

    pub fn insert(&mut self, label: &str, score: f32) {
        self.scores.insert(label.to_lowercase(), score.clamp(0.0, 1.0));
    }

    /// Score for a label, 0.0 when absent.
    pub fn get(&self, label: &str) -> f32 {
        self.scores.get(&label.to_lowercase()).copied().unwrap_or(0.0)
    }

    pub fn positive(&self) -> f32 {
        self.get("positive")
    }

    pub fn negative(&self) -> f32 {
        self.get("negative")
    }
}

/// Classifies one review into label confidences.
pub trait SentimentModel: Send + Sync {
    fn classify(&self, text: &str) -> Result<LabelScores, ModelError>;

    /// Classify a batch; the default maps `classify` over the slice and fails
    /// the whole batch on the first error.
    fn classify_batch(&self, texts: &[String]) -> Result<Vec<LabelScores>, ModelError> {
        texts.iter().map(|t| self.classify(t)).collect()
    }

    /// Model name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Produces an abstractive/extractive summary of `text` bounded to
/// `[min_words, max_words]` whitespace words.
pub trait SummaryModel: Send + Sync {
    fn summarize(&self, text: &str, min_words: usize, max_words: usize)
        -> Result<String, ModelError>;

    /// Maximum input length in whitespace tokens; callers truncate to this.
    fn max_input_tokens(&self) -> usize {
        DEFAULT_MAX_INPUT_TOKENS
    }

    /// Model name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Shared handle aliases used by the engines and the orchestrator.
pub type DynSentimentModel = Arc<dyn SentimentModel>;
pub type DynSummaryModel = Arc<dyn SummaryModel>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_scores_lowercase_and_clamp() {
        let mut s = LabelScores::new();
        s.insert("POSITIVE", 1.7);
        s.insert("Negative", -0.3);
        assert_eq!(s.positive(), 1.0);
        assert_eq!(s.negative(), 0.0);
        assert_eq!(s.get("missing"), 0.0);
    }

    #[test]
    fn from_polarity_round_trips() {
        let s = LabelScores::from_polarity(0.9, 0.05);
        assert!((s.positive() - 0.9).abs() < f32::EPSILON);
        assert!((s.negative() - 0.05).abs() < f32::EPSILON);
    }
}
