// src/config.rs
//! Pipeline configuration loaded from TOML.
//!
//! Resolution order: `PIPELINE_CONFIG_PATH` env var, then
//! `config/pipeline.toml`, then built-in defaults. Out-of-range numeric values
//! are sanitized back to defaults rather than rejected, so a typo in one knob
//! does not take down an overnight run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// --- env defaults & names ---
pub const DEFAULT_PIPELINE_CONFIG_PATH: &str = "config/pipeline.toml";
pub const ENV_PIPELINE_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";

fn default_reviews_dir() -> PathBuf {
    PathBuf::from("data/reviews_per_movie")
}
fn default_genre_dir() -> PathBuf {
    PathBuf::from("data/movies_per_genre")
}
fn default_output_file() -> PathBuf {
    PathBuf::from("data/processed/all_movies_processed.csv")
}
fn default_sample_output_file() -> PathBuf {
    PathBuf::from("data/processed/sample_output.csv")
}
fn default_checkpoint_file() -> PathBuf {
    PathBuf::from("data/processed/pipeline_checkpoint.json")
}

fn default_batch_size() -> usize {
    32
}
fn default_positive_weight() -> f32 {
    1.1
}
fn default_negative_weight() -> f32 {
    0.9
}
fn default_min_review_chars() -> usize {
    10
}
fn default_max_review_chars() -> usize {
    2000
}

fn default_synopsis_min_chars() -> usize {
    80
}
fn default_reviews_per_group() -> usize {
    10
}
fn default_group_min_words() -> usize {
    30
}
fn default_group_max_words() -> usize {
    100
}
fn default_final_min_words() -> usize {
    80
}
fn default_target_words() -> usize {
    200
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of per-movie review CSVs (flat, plus per-genre subdirs).
    pub reviews_dir: PathBuf,
    /// Directory of per-genre movie list CSVs; file stem = genre name.
    pub genre_dir: PathBuf,
    /// Optional master details CSV with pass-through fields.
    pub details_file: Option<PathBuf>,
    pub output_file: PathBuf,
    pub sample_output_file: PathBuf,
    pub checkpoint_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            reviews_dir: default_reviews_dir(),
            genre_dir: default_genre_dir(),
            details_file: None,
            output_file: default_output_file(),
            sample_output_file: default_sample_output_file(),
            checkpoint_file: default_checkpoint_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Reviews per classifier call; throughput/memory knob, not concurrency.
    pub batch_size: usize,
    /// Weight applied to the positive confidence.
    pub positive_weight: f32,
    /// Weight applied to the negative confidence.
    pub negative_weight: f32,
    pub min_review_chars: usize,
    pub max_review_chars: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            positive_weight: default_positive_weight(),
            negative_weight: default_negative_weight(),
            min_review_chars: default_min_review_chars(),
            max_review_chars: default_max_review_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynopsisConfig {
    pub min_review_chars: usize,
    /// Reviews concatenated per stage-1 group.
    pub reviews_per_group: usize,
    /// Stage-1 intermediate summary bounds (words).
    pub group_min_words: usize,
    pub group_max_words: usize,
    /// Stage-2 final summary bounds (words).
    pub final_min_words: usize,
    pub target_words: usize,
}

impl Default for SynopsisConfig {
    fn default() -> Self {
        Self {
            min_review_chars: default_synopsis_min_chars(),
            reviews_per_group: default_reviews_per_group(),
            group_min_words: default_group_min_words(),
            group_max_words: default_group_max_words(),
            final_min_words: default_final_min_words(),
            target_words: default_target_words(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub sentiment: SentimentConfig,
    pub synopsis: SynopsisConfig,
}

impl PipelineConfig {
    /// Load from `PIPELINE_CONFIG_PATH` or the default path. A missing file
    /// yields defaults; an unreadable or unparsable file is an error (an
    /// operator typo should not silently run with defaults).
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_PIPELINE_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PIPELINE_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no pipeline config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to read pipeline config at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: PipelineConfig = toml::from_str(toml_str)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Clamp nonsense values back to defaults.
    fn sanitize(&mut self) {
        if self.sentiment.batch_size == 0 {
            self.sentiment.batch_size = default_batch_size();
        }
        if !self.sentiment.positive_weight.is_finite() || self.sentiment.positive_weight < 0.0 {
            self.sentiment.positive_weight = default_positive_weight();
        }
        if !self.sentiment.negative_weight.is_finite() || self.sentiment.negative_weight < 0.0 {
            self.sentiment.negative_weight = default_negative_weight();
        }
        if self.sentiment.min_review_chars > self.sentiment.max_review_chars {
            std::mem::swap(
                &mut self.sentiment.min_review_chars,
                &mut self.sentiment.max_review_chars,
            );
        }
        if self.synopsis.reviews_per_group == 0 {
            self.synopsis.reviews_per_group = default_reviews_per_group();
        }
        if self.synopsis.group_min_words > self.synopsis.group_max_words {
            std::mem::swap(
                &mut self.synopsis.group_min_words,
                &mut self.synopsis.group_max_words,
            );
        }
        if self.synopsis.final_min_words > self.synopsis.target_words {
            std::mem::swap(
                &mut self.synopsis.final_min_words,
                &mut self.synopsis.target_words,
            );
        }
        if self.synopsis.target_words == 0 {
            self.synopsis.target_words = default_target_words();
        }
    }
}
