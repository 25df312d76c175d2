// src/filter.rs
//! Review filter: normalization plus length-bounds validation.
//!
//! Pure and deterministic. The two downstream engines call this with their own
//! bounds because they tolerate different amounts of noise: sentiment accepts
//! short reviews the summarizer would only add noise from.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Sentiment input bounds (chars of normalized text).
pub const SENTIMENT_MIN_CHARS: usize = 10;
pub const SENTIMENT_MAX_CHARS: usize = 2000;

/// Summarization input lower bound; no upper bound.
pub const SYNOPSIS_MIN_CHARS: usize = 80;

/// Inclusive character bounds on normalized review length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub min_chars: usize,
    /// `None` means unbounded above.
    pub max_chars: Option<usize>,
}

impl LengthBounds {
    pub fn new(min_chars: usize, max_chars: Option<usize>) -> Self {
        Self {
            min_chars,
            max_chars,
        }
    }

    /// Default bounds for the sentiment aggregator: [10, 2000].
    pub fn sentiment() -> Self {
        Self::new(SENTIMENT_MIN_CHARS, Some(SENTIMENT_MAX_CHARS))
    }

    /// Default bounds for the summarizer: [80, unbounded).
    pub fn synopsis() -> Self {
        Self::new(SYNOPSIS_MIN_CHARS, None)
    }

    pub fn contains(&self, len_chars: usize) -> bool {
        len_chars >= self.min_chars && self.max_chars.map_or(true, |max| len_chars <= max)
    }
}

/// Normalize one raw review: decode HTML entities, strip tags, collapse
/// internal whitespace to single spaces, trim.
pub fn normalize_review(raw: &str) -> String {
    // 1) HTML entity decode (scraped text carries &amp; &quot; etc.)
    let mut out = html_escape::decode_html_entities(raw).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Lazily yield normalized reviews whose char length fits `bounds`.
pub fn filter_reviews<'a, I, S>(reviews: I, bounds: LengthBounds) -> impl Iterator<Item = String> + 'a
where
    I: IntoIterator<Item = S> + 'a,
    S: AsRef<str>,
{
    reviews.into_iter().filter_map(move |raw| {
        let cleaned = normalize_review(raw.as_ref());
        let len = cleaned.chars().count();
        bounds.contains(len).then_some(cleaned)
    })
}

/// Short stable hash for referring to review text in logs without leaking it.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
