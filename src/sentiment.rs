// src/sentiment.rs
//! # Sentiment Aggregator
//! Maps a movie's review set to a predicted rating on the 0-10 scale.
//!
//! Reviews are validated, classified in fixed-size batches, combined into a
//! weighted polarity score per review, averaged, and scaled. A classifier
//! failure never leaves this module: the movie gets a zero rating with the
//! `degraded` flag set and the orchestrator moves on.

use tracing::{debug, error};

use crate::config::SentimentConfig;
use crate::filter::{anon_hash, filter_reviews, LengthBounds};
use crate::model::DynSentimentModel;

/// Aggregation result with its evidence count.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingOutcome {
    /// Predicted rating in [0.0, 10.0], one decimal place.
    pub rating: f32,
    /// Number of reviews that contributed evidence.
    pub reviews_scored: usize,
    /// True when the classifier failed and the rating is a placeholder.
    pub degraded: bool,
}

impl RatingOutcome {
    fn no_evidence() -> Self {
        Self {
            rating: 0.0,
            reviews_scored: 0,
            degraded: false,
        }
    }

    fn model_failure() -> Self {
        Self {
            rating: 0.0,
            reviews_scored: 0,
            degraded: true,
        }
    }
}

pub struct SentimentAggregator {
    model: DynSentimentModel,
    cfg: SentimentConfig,
}

impl SentimentAggregator {
    pub fn new(model: DynSentimentModel, cfg: SentimentConfig) -> Self {
        Self { model, cfg }
    }

    /// Predict a rating from raw review texts. Infallible by contract: input
    /// and model problems degrade the outcome instead of propagating.
    pub fn predict_rating<I, S>(&self, reviews: I) -> RatingOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bounds = LengthBounds::new(
            self.cfg.min_review_chars,
            Some(self.cfg.max_review_chars),
        );
        let valid: Vec<String> = filter_reviews(reviews, bounds).collect();
        if valid.is_empty() {
            return RatingOutcome::no_evidence();
        }

        let mut weighted_sum = 0.0f32;
        let mut scored = 0usize;

        // batch_size is sanitized on load but the field is pub; 0 would panic
        let batch_size = self.cfg.batch_size.max(1);
        for (batch_idx, batch) in valid.chunks(batch_size).enumerate() {
            let scores = match self.model.classify_batch(batch) {
                Ok(s) => s,
                Err(e) => {
                    error!(
                        model = self.model.name(),
                        batch = batch_idx,
                        first = %anon_hash(&batch[0]),
                        error = %e,
                        "classifier batch failed; rating degraded to 0.0"
                    );
                    return RatingOutcome::model_failure();
                }
            };

            for s in &scores {
                weighted_sum += s.positive() * self.cfg.positive_weight
                    - s.negative() * self.cfg.negative_weight;
                scored += 1;
            }
        }

        let avg = weighted_sum / scored as f32;
        let rating = round1(avg * 10.0).clamp(0.0, 10.0);
        debug!(reviews = scored, avg_weighted = avg, rating, "rating aggregated");

        RatingOutcome {
            rating,
            reviews_scored: scored,
            degraded: false,
        }
    }
}

/// Round to one decimal place.
fn round1(x: f32) -> f32 {
    (x * 10.0).round() / 10.0
}
