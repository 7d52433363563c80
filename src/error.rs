// src/error.rs

//! Error types for the ingest pipeline
//!
//! Per-file errors (`Io`, `Decode`, `Serialize`, `Store`) are caught at the
//! worker boundary and turned into failed processing records. Only
//! `SourceDir` and store open failures are fatal to a run.

use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read source directory {path}: {source}")]
    SourceDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to decode manifest: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to serialize descriptor: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}

impl Error {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
