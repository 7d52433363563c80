// src/cache.rs
//! Run-scoped dedup cache
//!
//! Memoizes serialized descriptors by source file path for the lifetime of a
//! run. Entries are never evicted or persisted, so the cache holds at most
//! one entry per distinct path processed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Thread-safe cache of converted descriptor bytes
///
/// Readers proceed concurrently; a writer takes the lock exclusively.
#[derive(Debug, Default, Clone)]
pub struct DedupCache {
    entries: Arc<RwLock<HashMap<PathBuf, Arc<[u8]>>>>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached bytes for a source path
    pub fn get(&self, path: &Path) -> Option<Arc<[u8]>> {
        let entries = self.entries.read().ok()?;
        entries.get(path).cloned()
    }

    /// Store the bytes produced for a source path
    pub fn set(&self, path: impl Into<PathBuf>, bytes: impl Into<Arc<[u8]>>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(path.into(), bytes.into());
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
