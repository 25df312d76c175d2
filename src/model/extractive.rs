// src/model/extractive.rs
//! Built-in frequency-based extractive summarizer: the default `SummaryModel`
//! when no external inference runtime is wired in.
//!
//! Sentences are scored by average term frequency of their non-stopword
//! tokens plus a small early-position bonus, then selected greedily into the
//! word budget and emitted in original order. Fully deterministic: every sort
//! breaks ties on sentence position.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::ModelError;
use crate::model::{SummaryModel, DEFAULT_MAX_INPUT_TOKENS};

/// Sentences shorter than this many words are treated as noise.
const MIN_SENTENCE_WORDS: usize = 3;

#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    max_input_tokens: usize,
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self {
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
        }
    }

    #[cfg(test)]
    fn with_max_input_tokens(max_input_tokens: usize) -> Self {
        Self { max_input_tokens }
    }
}

impl SummaryModel for ExtractiveSummarizer {
    fn summarize(
        &self,
        text: &str,
        min_words: usize,
        max_words: usize,
    ) -> Result<String, ModelError> {
        if max_words == 0 {
            return Err(ModelError::Inference("max_words must be > 0".into()));
        }

        let sentences = split_sentences(text);
        if sentences.is_empty() {
            // No sentence survived the noise cut; fall back to a plain word
            // truncation so short-but-real input still produces output.
            let truncated = truncate_words(text, max_words);
            return Ok(truncated);
        }

        let freq = word_frequencies(&sentences);
        let mut scored: Vec<ScoredSentence> = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| ScoredSentence {
                position: i,
                words: word_count(s),
                score: score_sentence(s, i, sentences.len(), &freq),
                text: s.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });

        // Greedy fill: best sentences first, stop before busting the budget
        // once the minimum is met.
        let mut picked: Vec<&ScoredSentence> = Vec::new();
        let mut budget_used = 0usize;
        for s in &scored {
            if budget_used + s.words > max_words {
                if budget_used >= min_words {
                    continue;
                }
                // Still under the minimum: take a truncated slice of this
                // sentence to get as close to the budget as we can.
                if picked.is_empty() && s.words > max_words {
                    return Ok(truncate_words(&s.text, max_words));
                }
                continue;
            }
            budget_used += s.words;
            picked.push(s);
        }

        // Emit in original order to keep the summary readable.
        picked.sort_by_key(|s| s.position);
        let out = picked
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(out)
    }

    fn max_input_tokens(&self) -> usize {
        self.max_input_tokens
    }

    fn name(&self) -> &'static str {
        "extractive"
    }
}

#[derive(Debug, Clone)]
struct ScoredSentence {
    position: usize,
    words: usize,
    score: f32,
    text: String,
}

/// Split into sentences at terminal punctuation; drops fragments below
/// `MIN_SENTENCE_WORDS` words.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);

    sentences
}

fn push_sentence(out: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && word_count(trimmed) >= MIN_SENTENCE_WORDS {
        out.push(trimmed.to_string());
    }
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Keep at most `max_words` whitespace words.
fn truncate_words(s: &str, max_words: usize) -> String {
    s.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(|t| t.to_ascii_lowercase())
}

fn word_frequencies(sentences: &[String]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for s in sentences {
        for tok in tokenize(s) {
            if !is_stopword(&tok) {
                *counts.entry(tok).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Average term frequency of content words plus a small bonus for sentences
/// near the start of the text.
fn score_sentence(
    sentence: &str,
    position: usize,
    total: usize,
    freq: &HashMap<String, usize>,
) -> f32 {
    let mut sum = 0.0f32;
    let mut n = 0usize;
    for tok in tokenize(sentence) {
        if is_stopword(&tok) {
            continue;
        }
        sum += *freq.get(&tok).unwrap_or(&0) as f32;
        n += 1;
    }
    let tf = if n == 0 { 0.0 } else { sum / n as f32 };

    let position_bonus = if total > 1 {
        0.25 * (1.0 - position as f32 / (total - 1) as f32)
    } else {
        0.25
    };

    tf + position_bonus
}

fn is_stopword(word: &str) -> bool {
    const STOPWORDS: &[&str] = &[
        "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
        "does", "did", "will", "would", "could", "should", "may", "might", "must", "can", "this",
        "that", "these", "those", "it", "its", "as", "if", "then", "than", "so", "such", "no",
        "not", "only", "own", "same", "too", "very", "just", "also", "now", "here", "there",
        "when", "where", "why", "how", "all", "each", "every", "both", "few", "more", "most",
        "other", "some", "any", "into", "through", "during", "before", "after", "about", "he",
        "she", "they", "we", "you", "i", "me", "my", "your", "his", "her", "their", "our",
        "which", "who", "whom", "what", "whose", "movie", "film",
    ];
    STOPWORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVIEW_BLOB: &str = "The acting in this film was superb from start to finish. \
        The cinematography captures the city beautifully at night. \
        Some scenes in the middle drag on far too long. \
        The acting alone makes this worth watching twice. \
        A short note. \
        The soundtrack choices felt fresh and never intrusive.";

    #[test]
    fn respects_word_budget() {
        let m = ExtractiveSummarizer::new();
        let out = m.summarize(REVIEW_BLOB, 5, 20).unwrap();
        let n = word_count(&out);
        assert!(n <= 20, "got {n} words: {out}");
        assert!(n >= 5, "got {n} words: {out}");
    }

    #[test]
    fn deterministic_across_runs() {
        let m = ExtractiveSummarizer::new();
        let a = m.summarize(REVIEW_BLOB, 10, 40).unwrap();
        let b = m.summarize(REVIEW_BLOB, 10, 40).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn preserves_original_sentence_order() {
        let m = ExtractiveSummarizer::new();
        let out = m.summarize(REVIEW_BLOB, 10, 60).unwrap();
        let acting = out.find("acting in this film").unwrap_or(usize::MAX);
        let soundtrack = out.find("soundtrack").unwrap_or(usize::MAX);
        if acting != usize::MAX && soundtrack != usize::MAX {
            assert!(acting < soundtrack);
        }
    }

    #[test]
    fn drops_noise_fragments() {
        let sentences = split_sentences("Ok. This one is long enough to keep. No!");
        assert_eq!(sentences, vec!["This one is long enough to keep."]);
    }

    #[test]
    fn oversized_single_sentence_is_truncated() {
        let long = format!("word {}.", "filler ".repeat(100));
        let m = ExtractiveSummarizer::new();
        let out = m.summarize(&long, 5, 10).unwrap();
        assert!(word_count(&out) <= 10);
    }

    #[test]
    fn zero_budget_is_an_error() {
        let m = ExtractiveSummarizer::new();
        assert!(m.summarize("Anything at all here.", 0, 0).is_err());
    }

    #[test]
    fn reports_configured_input_cap() {
        let m = ExtractiveSummarizer::with_max_input_tokens(64);
        assert_eq!(m.max_input_tokens(), 64);
    }
}
