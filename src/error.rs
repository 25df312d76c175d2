// src/error.rs
//! Error taxonomy for the review pipeline.
//!
//! Three kinds with distinct recovery policies:
//! - [`InputError`]: a movie's input is missing or unreadable; recovered
//!   locally, the movie proceeds with degraded output.
//! - [`ModelError`]: classifier/summarizer initialization or inference
//!   failure; recovered locally per engine, never aborts the other engine.
//! - [`PersistenceError`]: checkpoint or output write failure; fatal, aborts
//!   the run so progress is never silently lost.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Missing or malformed pipeline input. Recoverable per movie.
#[derive(Error, Debug)]
pub enum InputError {
    /// No review file matched any candidate name for the title.
    #[error("no review file found for `{title}`")]
    ReviewFileMissing { title: String },

    /// A review or metadata CSV could not be read.
    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV file could not be parsed as rows of the expected shape.
    #[error("malformed CSV in {path}: {source}")]
    MalformedCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The run plan is empty (no genre files found).
    #[error("no genre CSV files under {dir}")]
    EmptyPlan { dir: PathBuf },
}

impl InputError {
    /// Split a csv error into unreadable (I/O) vs malformed (parse).
    pub(crate) fn from_csv(path: &Path, e: csv::Error) -> Self {
        if e.is_io_error() {
            match e.into_kind() {
                csv::ErrorKind::Io(source) => Self::Unreadable {
                    path: path.to_path_buf(),
                    source,
                },
                // is_io_error() guarantees the Io kind
                _ => unreachable!(),
            }
        } else {
            Self::MalformedCsv {
                path: path.to_path_buf(),
                source: e,
            }
        }
    }
}

/// Model-boundary failure. Recoverable per engine.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model could not be constructed/loaded.
    #[error("model init failed: {0}")]
    Init(String),

    /// A single inference call failed.
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Checkpoint or output write failure. Fatal for the run.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("checkpoint I/O at {path}: {source}")]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output write to {path}: {source}")]
    OutputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output serialization to {path}: {source}")]
    OutputCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl PersistenceError {
    /// Split a csv error into output I/O vs serialization failure.
    pub(crate) fn from_output_csv(path: &Path, e: csv::Error) -> Self {
        if e.is_io_error() {
            match e.into_kind() {
                csv::ErrorKind::Io(source) => Self::OutputIo {
                    path: path.to_path_buf(),
                    source,
                },
                // is_io_error() guarantees the Io kind
                _ => unreachable!(),
            }
        } else {
            Self::OutputCsv {
                path: path.to_path_buf(),
                source: e,
            }
        }
    }
}

/// Top-level error returned by pipeline runs. Per-movie input and model
/// failures are absorbed inside the loop; only plan-level input problems and
/// persistence failures surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
