// src/store/mod.rs
//! Ordered key-value persistence for converted packages
//!
//! The pipeline uses two key spaces:
//! - `<package-name>` holds the serialized descriptor
//! - `file:<file-name>` holds the package name, as a back-reference
//!
//! Implementations must make each `get` and `put` atomic and safe to call
//! from many threads at once. The pipeline never needs more than that: there
//! are no multi-key transactions.

mod guard;
mod memory;
mod sqlite;

pub use guard::{ALREADY_PRESENT_NOTE, IdempotencyGuard};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use thiserror::Error;

/// Prefix of the file-name back-reference keys
pub const FILE_KEY_PREFIX: &str = "file:";

/// Key under which a file's back-reference is stored
pub fn file_key(file_name: &str) -> String {
    format!("{}{}", FILE_KEY_PREFIX, file_name)
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open store at {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Options for opening an on-disk store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Directory holding the store files (created if missing)
    pub dir_path: PathBuf,
    /// Database file name inside `dir_path`
    pub file_name: String,
}

impl StoreOptions {
    pub fn new(dir_path: impl Into<PathBuf>) -> Self {
        Self {
            dir_path: dir_path.into(),
            file_name: "packages.db".to_string(),
        }
    }

    /// Full path of the database file
    pub fn db_path(&self) -> PathBuf {
        self.dir_path.join(&self.file_name)
    }
}

/// Options for iterating the key space
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Only visit keys starting with these bytes
    pub prefix: Option<Vec<u8>>,
    /// Visit keys in descending order
    pub reverse: bool,
}

impl ScanOptions {
    pub fn with_prefix(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            reverse: false,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    fn matches(&self, key: &[u8]) -> bool {
        self.prefix
            .as_deref()
            .map_or(true, |prefix| key.starts_with(prefix))
    }
}

/// One key-value pair returned by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Ordered key-value store
pub trait Store: Send + Sync {
    /// Fetch the value for `key`, or `None` if it is not present
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or replace the value for `key`
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Return all pairs matching `options`, ordered by key
    fn scan(&self, options: &ScanOptions) -> Result<Vec<KeyValue>, StoreError>;

    /// Check whether `key` is present
    fn contains(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_key() {
        assert_eq!(file_key("foo.json"), "file:foo.json");
    }

    #[test]
    fn test_store_options_db_path() {
        let options = StoreOptions::new("/var/lib/nox");
        assert_eq!(options.db_path(), PathBuf::from("/var/lib/nox/packages.db"));
    }

    #[test]
    fn test_scan_options_matches() {
        assert!(ScanOptions::default().matches(b"anything"));
        let options = ScanOptions::with_prefix("file:");
        assert!(options.matches(b"file:foo.json"));
        assert!(!options.matches(b"foo"));
        assert!(options.reversed().reverse);
    }
}
