// src/output.rs
//! CSV sink for processed movies.
//!
//! A completed run emits exactly one row per planned movie, degraded values
//! included, so downstream consumers never special-case absent titles. Rows
//! are flushed individually: the checkpoint is only advanced once its row is
//! durably out of process buffers.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PersistenceError;

/// One processed movie. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub title: String,
    pub predicted_rating: f32,
    pub genre: String,
    pub synopsis: String,
    pub num_reviews: usize,
    pub movie_length: String,
    pub release_year: String,
}

/// Sequential writer over the output CSV. The pipeline is the sole writer;
/// no locking, just per-row flushes.
pub struct ResultWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl ResultWriter {
    /// Truncate the output and start with a header (fresh run).
    pub fn create(path: &Path) -> Result<Self, PersistenceError> {
        ensure_parent(path)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| PersistenceError::from_output_csv(path, e))?;
        debug!(path = %path.display(), "output file created");
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Continue an interrupted run: append rows without repeating the
    /// header. A missing file degenerates to `create`.
    pub fn append(path: &Path) -> Result<Self, PersistenceError> {
        if !path.is_file() {
            return Self::create(path);
        }
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|source| PersistenceError::OutputIo {
                path: path.to_path_buf(),
                source,
            })?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        debug!(path = %path.display(), "output file opened for append");
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and flush one row.
    pub fn write_row(&mut self, row: &ResultRow) -> Result<(), PersistenceError> {
        self.writer
            .serialize(row)
            .map_err(|e| PersistenceError::from_output_csv(&self.path, e))?;
        self.writer
            .flush()
            .map_err(|source| PersistenceError::OutputIo {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| PersistenceError::OutputIo {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
