// src/config.rs
//! Run configuration
//!
//! Collects everything a run needs from the command line and the
//! environment, with the defaults applied.

use crate::pipeline::default_workers;
use std::path::PathBuf;

/// Store directory used when neither the command line nor the environment
/// names one
pub const DEFAULT_STORE_DIR: &str = "nox_packages";

/// Environment variable overriding the default store directory
pub const STORE_DIR_ENV: &str = "NOX_STORE_DIR";

pub const DEFAULT_LOG_FILE: &str = "processing.log";
pub const DEFAULT_DETAILS_FILE: &str = "processing_details.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Directory holding the source manifests
    pub source_dir: PathBuf,
    /// Directory holding the key-value store
    pub store_dir: PathBuf,
    /// Number of parallel workers
    pub workers: usize,
    /// Verbose output, field diagnostics and the details artifact
    pub debug: bool,
    /// Line-oriented processing log
    pub log_path: PathBuf,
    /// JSON array of all records, written in debug mode
    pub details_path: PathBuf,
}

impl RunConfig {
    /// Configuration with every optional setting at its default
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            workers: default_workers(),
            debug: false,
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
            details_path: PathBuf::from(DEFAULT_DETAILS_FILE),
        }
    }

    /// Resolve the store directory: explicit value, then `NOX_STORE_DIR`,
    /// then the default
    pub fn with_store_dir(mut self, store_dir: Option<PathBuf>) -> Self {
        let env_dir = std::env::var_os(STORE_DIR_ENV).map(PathBuf::from);
        self.store_dir = resolve_store_dir(store_dir, env_dir);
        self
    }

    /// Use `workers` if given; values below one clamp to one
    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        if let Some(workers) = workers {
            self.workers = workers.max(1);
        }
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_log_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.log_path = path;
        }
        self
    }

    pub fn with_details_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.details_path = path;
        }
        self
    }

    /// Where the details artifact goes, if this run writes one
    pub fn details_output(&self) -> Option<PathBuf> {
        self.debug.then(|| self.details_path.clone())
    }
}

fn resolve_store_dir(explicit: Option<PathBuf>, from_env: Option<PathBuf>) -> PathBuf {
    explicit
        .or(from_env.filter(|dir| !dir.as_os_str().is_empty()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
}
