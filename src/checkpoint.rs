// src/checkpoint.rs
//! Crash-safe run progress.
//!
//! The pipeline checkpoints after every durably written output row. `row` is
//! the index of the next unprocessed row in `genre_file`; `processed` holds
//! the titles already written this run, so duplicate plan rows (the same
//! movie listed under several genres) and the at-least-once replay window
//! after a crash never produce duplicate output. Writes go through a tmp
//! file renamed into place; a crash mid-write leaves the previous state.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PersistenceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub genre_file: String,
    pub row: usize,
    #[serde(default)]
    pub processed: BTreeSet<String>,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(genre_file: impl Into<String>, row: usize, processed: BTreeSet<String>) -> Self {
        Self {
            genre_file: genre_file.into(),
            row,
            processed,
            updated_at: Utc::now(),
        }
    }
}

/// Load/save/clear for the checkpoint file.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` for a missing file (fresh start) and for an unparsable one:
    /// reprocessing is safer than trusting a bad offset.
    pub fn load(&self) -> Result<Option<Checkpoint>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Checkpoint {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        match serde_json::from_slice::<Checkpoint>(&bytes) {
            Ok(checkpoint) => {
                debug!(
                    genre_file = checkpoint.genre_file,
                    row = checkpoint.row,
                    processed = checkpoint.processed.len(),
                    "checkpoint loaded"
                );
                Ok(Some(checkpoint))
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "checkpoint unparsable; starting fresh"
                );
                Ok(None)
            }
        }
    }

    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Checkpoint {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let json = serde_json::to_string(checkpoint)
            .map_err(|e| io_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp).map_err(io_err)?;
        f.write_all(json.as_bytes()).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(genre_file = checkpoint.genre_file, row = checkpoint.row, "checkpoint saved");
        Ok(())
    }

    /// Remove the checkpoint; a missing file is already cleared.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Checkpoint {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
