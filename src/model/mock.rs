// src/model/mock.rs
//! Scripted and failing model stand-ins for tests and local runs.
//!
//! Kept in the library (not behind `cfg(test)`) so integration tests and
//! downstream callers can wire them into the pipeline the same way the real
//! models are wired.

use std::sync::Mutex;

use crate::error::ModelError;
use crate::model::{LabelScores, SentimentModel, SummaryModel, DEFAULT_MAX_INPUT_TOKENS};

/// Returns a fixed `(positive, negative)` pair for every review.
#[derive(Debug, Clone)]
pub struct ConstSentimentModel {
    pub positive: f32,
    pub negative: f32,
}

impl ConstSentimentModel {
    pub fn new(positive: f32, negative: f32) -> Self {
        Self { positive, negative }
    }
}

impl SentimentModel for ConstSentimentModel {
    fn classify(&self, _text: &str) -> Result<LabelScores, ModelError> {
        Ok(LabelScores::from_polarity(self.positive, self.negative))
    }
    fn name(&self) -> &'static str {
        "const-sentiment"
    }
}

/// Replays a fixed script of `(positive, negative)` pairs in call order,
/// cycling when the script is exhausted.
pub struct ScriptedSentimentModel {
    script: Vec<(f32, f32)>,
    next: Mutex<usize>,
}

impl ScriptedSentimentModel {
    pub fn new(script: Vec<(f32, f32)>) -> Self {
        assert!(!script.is_empty(), "script must not be empty");
        Self {
            script,
            next: Mutex::new(0),
        }
    }
}

impl SentimentModel for ScriptedSentimentModel {
    fn classify(&self, _text: &str) -> Result<LabelScores, ModelError> {
        let mut idx = self.next.lock().expect("script cursor poisoned");
        let (p, n) = self.script[*idx % self.script.len()];
        *idx += 1;
        Ok(LabelScores::from_polarity(p, n))
    }
    fn name(&self) -> &'static str {
        "scripted-sentiment"
    }
}

/// Fails every classification, for exercising degraded paths.
#[derive(Debug, Clone, Default)]
pub struct FailingSentimentModel;

impl SentimentModel for FailingSentimentModel {
    fn classify(&self, _text: &str) -> Result<LabelScores, ModelError> {
        Err(ModelError::Inference("scripted classifier failure".into()))
    }
    fn name(&self) -> &'static str {
        "failing-sentiment"
    }
}

/// Deterministic summary stub: echoes the first `max_words` words of the
/// input, which makes assertions about staging and truncation easy.
#[derive(Debug, Clone)]
pub struct EchoSummaryModel {
    max_input_tokens: usize,
}

impl Default for EchoSummaryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoSummaryModel {
    pub fn new() -> Self {
        Self {
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
        }
    }

    pub fn with_max_input_tokens(max_input_tokens: usize) -> Self {
        Self { max_input_tokens }
    }
}

impl SummaryModel for EchoSummaryModel {
    fn summarize(
        &self,
        text: &str,
        _min_words: usize,
        max_words: usize,
    ) -> Result<String, ModelError> {
        Ok(text
            .split_whitespace()
            .take(max_words)
            .collect::<Vec<_>>()
            .join(" "))
    }
    fn max_input_tokens(&self) -> usize {
        self.max_input_tokens
    }
    fn name(&self) -> &'static str {
        "echo-summary"
    }
}

/// Fails every summarization, for exercising the sentinel fallback.
#[derive(Debug, Clone, Default)]
pub struct FailingSummaryModel;

impl SummaryModel for FailingSummaryModel {
    fn summarize(
        &self,
        _text: &str,
        _min_words: usize,
        _max_words: usize,
    ) -> Result<String, ModelError> {
        Err(ModelError::Inference("scripted summarizer failure".into()))
    }
    fn name(&self) -> &'static str {
        "failing-summary"
    }
}
