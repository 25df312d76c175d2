// src/synopsis.rs
//! # Hierarchical Summarizer
//! Produces a bounded-length synopsis from an unbounded review set.
//!
//! Two stages because hundreds of reviews cannot fit one model context:
//! stage 1 summarizes fixed-size groups of reviews into short intermediates,
//! stage 2 summarizes the concatenated intermediates into the final synopsis.
//! The output is never empty; insufficient input and model errors both map to
//! fixed sentinel strings so the orchestrator always has something to persist.

use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::{error, warn};

use crate::config::SynopsisConfig;
use crate::error::ModelError;
use crate::filter::{anon_hash, filter_reviews, LengthBounds};
use crate::model::DynSummaryModel;

/// Default synopsis for movies with no loaded reviews at all.
pub const SYNOPSIS_UNAVAILABLE: &str = "No synopsis available";
/// Fewer than two valid reviews survived the length filter.
pub const SYNOPSIS_INSUFFICIENT: &str = "No synopsis available (insufficient valid reviews)";
/// A summarization stage failed.
pub const SYNOPSIS_SYSTEM_ERROR: &str = "No synopsis available (system error)";

/// Minimum count of valid reviews worth summarizing.
const MIN_VALID_REVIEWS: usize = 2;

/// Generation result; `degraded` is true when `text` is a sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct SynopsisOutcome {
    pub text: String,
    pub degraded: bool,
}

impl SynopsisOutcome {
    fn sentinel(text: &str) -> Self {
        Self {
            text: text.to_string(),
            degraded: true,
        }
    }
}

pub struct SynopsisGenerator {
    model: DynSummaryModel,
    cfg: SynopsisConfig,
}

impl SynopsisGenerator {
    pub fn new(model: DynSummaryModel, cfg: SynopsisConfig) -> Self {
        Self { model, cfg }
    }

    /// Generate a synopsis from raw review texts. Infallible by contract:
    /// every failure path returns a sentinel instead of propagating.
    pub fn generate<I, S>(&self, reviews: I) -> SynopsisOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bounds = LengthBounds::new(self.cfg.min_review_chars, None);
        let valid: Vec<String> = filter_reviews(reviews, bounds).collect();
        if valid.len() < MIN_VALID_REVIEWS {
            return SynopsisOutcome::sentinel(SYNOPSIS_INSUFFICIENT);
        }

        match self.two_stage(&valid) {
            Ok(text) if !text.is_empty() => SynopsisOutcome {
                text,
                degraded: false,
            },
            Ok(_) => {
                warn!(
                    model = self.model.name(),
                    reviews = valid.len(),
                    "summarizer returned empty text"
                );
                SynopsisOutcome::sentinel(SYNOPSIS_SYSTEM_ERROR)
            }
            Err(e) => {
                error!(
                    model = self.model.name(),
                    reviews = valid.len(),
                    first = %anon_hash(&valid[0]),
                    error = %e,
                    "summarization failed; falling back to sentinel"
                );
                SynopsisOutcome::sentinel(SYNOPSIS_SYSTEM_ERROR)
            }
        }
    }

    fn two_stage(&self, valid: &[String]) -> Result<String, ModelError> {
        let max_in = self.model.max_input_tokens();

        // Stage 1: group summaries, each bounded short.
        // reviews_per_group is sanitized on load but the field is pub; 0 would panic
        let per_group = self.cfg.reviews_per_group.max(1);
        let mut intermediates = Vec::new();
        for group in valid.chunks(per_group) {
            let combined = group.join(" ");
            let truncated = truncate_tokens(&combined, max_in);
            let summary = self.model.summarize(
                &truncated,
                self.cfg.group_min_words,
                self.cfg.group_max_words,
            )?;
            intermediates.push(summary);
        }

        // Stage 2: summarize the intermediates into the final synopsis.
        let combined = intermediates.join(" ");
        let truncated = truncate_tokens(&combined, max_in);
        let final_summary = self.model.summarize(
            &truncated,
            self.cfg.final_min_words,
            self.cfg.target_words,
        )?;

        Ok(post_process(&final_summary))
    }
}

/// Keep at most `max_tokens` whitespace tokens (model context bound).
fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    text.split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse whitespace, ensure terminal punctuation, uppercase first letter.
fn post_process(raw: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    let mut out = re_ws.replace_all(raw, " ").trim().to_string();
    if out.is_empty() {
        return out;
    }
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    let mut c = out.chars();
    match c.next() {
        None => out,
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock::{EchoSummaryModel, FailingSummaryModel};
    use crate::model::ExtractiveSummarizer;
    use std::sync::Arc;

    fn long_review(tag: &str) -> String {
        format!(
            "{tag} perspective: the plot develops steadily, the characters feel real, \
             and the ending lands with genuine weight."
        )
    }

    fn generator(model: DynSummaryModel) -> SynopsisGenerator {
        SynopsisGenerator::new(model, SynopsisConfig::default())
    }

    #[test]
    fn zero_valid_reviews_yield_insufficient_sentinel() {
        let g = generator(Arc::new(EchoSummaryModel::new()));
        let out = g.generate(Vec::<String>::new());
        assert_eq!(out.text, SYNOPSIS_INSUFFICIENT);
        assert!(out.degraded);
    }

    #[test]
    fn one_valid_review_yields_insufficient_sentinel() {
        let g = generator(Arc::new(EchoSummaryModel::new()));
        let out = g.generate([long_review("Single"), "too short".to_string()]);
        assert_eq!(out.text, SYNOPSIS_INSUFFICIENT);
    }

    #[test]
    fn model_failure_yields_error_sentinel() {
        let g = generator(Arc::new(FailingSummaryModel));
        let out = g.generate([long_review("First"), long_review("Second")]);
        assert_eq!(out.text, SYNOPSIS_SYSTEM_ERROR);
        assert!(out.degraded);
    }

    #[test]
    fn identical_input_gives_byte_identical_output() {
        let reviews: Vec<String> = (0..25).map(|i| long_review(&format!("Viewer{i}"))).collect();
        let g = generator(Arc::new(ExtractiveSummarizer::new()));
        let a = g.generate(reviews.clone());
        let b = g.generate(reviews);
        assert_eq!(a.text, b.text);
        assert!(!a.degraded);
    }

    #[test]
    fn output_ends_with_punctuation_and_starts_uppercase() {
        let reviews: Vec<String> = vec![
            format!("the opening act drags a little but {}", long_review("one")),
            format!("the second half more than makes up for {}", long_review("two")),
        ];
        let g = generator(Arc::new(EchoSummaryModel::new()));
        let out = g.generate(reviews);
        assert!(!out.degraded);
        let first = out.text.chars().next().unwrap();
        assert!(first.is_uppercase(), "text: {}", out.text);
        assert!(out.text.ends_with(['.', '!', '?']), "text: {}", out.text);
    }

    #[test]
    fn input_is_truncated_to_model_context() {
        let mut cfg = SynopsisConfig::default();
        cfg.reviews_per_group = 2;
        let model = EchoSummaryModel::with_max_input_tokens(10);
        let g = SynopsisGenerator::new(Arc::new(model), cfg);
        let out = g.generate([long_review("First"), long_review("Second")]);
        assert!(!out.degraded);
        // stage inputs were cut to 10 tokens, so the echo output cannot exceed
        // that (plus the appended terminal period)
        assert!(out.text.split_whitespace().count() <= 10, "text: {}", out.text);
    }

    #[test]
    fn grouping_partitions_reviews_before_final_pass() {
        let mut cfg = SynopsisConfig::default();
        cfg.reviews_per_group = 2;
        cfg.group_max_words = 4;
        let g = SynopsisGenerator::new(Arc::new(EchoSummaryModel::new()), cfg);
        let out = g.generate([
            long_review("Alpha"),
            long_review("Beta"),
            long_review("Gamma"),
            long_review("Delta"),
        ]);
        assert!(!out.degraded);
        // two groups, four words each -> final text echoes both group heads
        assert!(out.text.starts_with("Alpha perspective:"), "text: {}", out.text);
        assert!(out.text.contains("Gamma perspective:"), "text: {}", out.text);
    }

    #[test]
    fn zero_group_size_falls_back_to_one() {
        // hand-built configs can bypass sanitize(); chunks(0) would panic
        let mut cfg = SynopsisConfig::default();
        cfg.reviews_per_group = 0;
        let g = SynopsisGenerator::new(Arc::new(EchoSummaryModel::new()), cfg);
        let out = g.generate([long_review("Alpha"), long_review("Beta")]);
        assert!(!out.degraded);
        assert!(out.text.starts_with("Alpha perspective:"), "text: {}", out.text);
    }

    #[test]
    fn post_process_shapes_raw_model_text() {
        assert_eq!(post_process("  a  decent  ending  "), "A decent ending.");
        assert_eq!(post_process("already fine!"), "Already fine!");
        assert_eq!(post_process(""), "");
    }
}
