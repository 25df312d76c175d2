// src/model/lexicon.rs
//! Built-in lexicon classifier: the default `SentimentModel` when no external
//! inference runtime is wired in. Word weights come from an embedded JSON
//! lexicon; a small negation window flips the sign of nearby opinion words.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::ModelError;
use crate::model::{LabelScores, SentimentModel};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// How many preceding tokens a negator reaches ("not very good" still flips).
const NEGATION_WINDOW: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Sum positive and negative weight mass separately, with negation
    /// flipping the sign of a hit when a negator sits within the window.
    fn weigh(text: &str) -> (f32, f32) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut pos = 0.0f32;
        let mut neg = 0.0f32;

        for i in 0..tokens.len() {
            let base = Self::word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=NEGATION_WINDOW).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            let adj = if negated { -base } else { base };
            if adj > 0 {
                pos += adj as f32;
            } else {
                neg += (-adj) as f32;
            }
        }

        (pos, neg)
    }
}

impl SentimentModel for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<LabelScores, ModelError> {
        let (pos, neg) = Self::weigh(text);
        let total = pos + neg;
        // No opinion words at all: report an even split rather than zeros so
        // neutral reviews don't read as maximally negative.
        let (p, n) = if total == 0.0 {
            (0.5, 0.5)
        } else {
            (pos / total, neg / total)
        };
        Ok(LabelScores::from_polarity(p, n))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
            | "hardly"
            | "barely"
    )
}
