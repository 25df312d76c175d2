// src/store.rs
//! File-based review store.
//!
//! Reviews live in per-movie CSV files named after the title. Two writers
//! produced those files over time with slightly different normalization
//! rules, so lookup tries a prioritized list of candidate names instead of a
//! single canonical one: the safe form of the title, its lowercased form,
//! and its underscore-collapsed lowercased form, each crossed with the
//! `_{year}_reviews.csv`, `_reviews.csv` and `.csv` suffixes. The flat store
//! root is searched first, then the per-genre subdirectory the scraper
//! writes into. No fuzzy matching: the first existing file wins.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::InputError;

/// One row of a per-movie review CSV. Columns beyond `content` are carried
/// by the files but not consumed by the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub username: String,
}

/// Review store rooted at a directory of per-movie CSV files.
#[derive(Debug, Clone)]
pub struct ReviewStore {
    root: PathBuf,
}

impl ReviewStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the review file for a title, or `None` if no candidate exists.
    pub fn locate(&self, title: &str, year: Option<i32>, genre: Option<&str>) -> Option<PathBuf> {
        let names = candidate_file_names(title, year);
        for name in &names {
            let path = self.root.join(name);
            if path.is_file() {
                return Some(path);
            }
        }
        if let Some(genre) = genre {
            for name in &names {
                let path = self.root.join(genre).join(name);
                if path.is_file() {
                    return Some(path);
                }
            }
        }
        debug!(title, candidates = names.len(), "no review file matched");
        None
    }

    /// Locate and load in one step.
    pub fn load_for_title(
        &self,
        title: &str,
        year: Option<i32>,
        genre: Option<&str>,
    ) -> Result<Vec<String>, InputError> {
        let Some(path) = self.locate(title, year, genre) else {
            return Err(InputError::ReviewFileMissing {
                title: title.to_string(),
            });
        };
        self.load_reviews(&path)
    }

    /// Load the non-empty `content` values of a review file, in file order.
    pub fn load_reviews(&self, path: &Path) -> Result<Vec<String>, InputError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| InputError::from_csv(path, e))?;

        let mut reviews = Vec::new();
        for record in reader.deserialize::<ReviewRecord>() {
            let record = record.map_err(|e| InputError::from_csv(path, e))?;
            if !record.content.trim().is_empty() {
                reviews.push(record.content);
            }
        }
        if reviews.is_empty() {
            warn!(path = %path.display(), "review file has no usable content");
        } else {
            debug!(path = %path.display(), loaded = reviews.len(), "loaded reviews");
        }
        Ok(reviews)
    }
}

/* ---- candidate name generation ---- */

/// Safe form of a title: alphanumerics, spaces and underscores survive,
/// everything else becomes `_`; spaces then become `_` and leading/trailing
/// underscores are trimmed.
pub(crate) fn safe_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    kept.replace(' ', "_").trim_matches('_').to_string()
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push(c);
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out
}

/// Candidate file names for a title in priority order. Stems are tried
/// most-literal first; within a stem, the year-tagged scraper name wins.
pub(crate) fn candidate_file_names(title: &str, year: Option<i32>) -> Vec<String> {
    let safe = safe_title(title);
    let lower = safe.to_lowercase();
    let collapsed = collapse_underscores(&lower);

    let mut stems: Vec<String> = Vec::new();
    for stem in [safe, lower, collapsed] {
        if !stems.contains(&stem) {
            stems.push(stem);
        }
    }

    let mut names = Vec::new();
    for stem in &stems {
        if let Some(year) = year {
            names.push(format!("{stem}_{year}_reviews.csv"));
        }
        names.push(format!("{stem}_reviews.csv"));
        names.push(format!("{stem}.csv"));
    }
    names
}
