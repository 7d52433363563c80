// src/store/sqlite.rs

//! SQLite-backed key-value store
//!
//! Keys live in a `WITHOUT ROWID` table whose primary key is the raw key
//! blob, so SQLite keeps them in byte order and prefix scans are range
//! scans. One connection is shared behind a mutex; every `get` and `put` is
//! a single statement and therefore atomic.

use super::{KeyValue, ScanOptions, Store, StoreError, StoreOptions};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv (
    key BLOB PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
) WITHOUT ROWID";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteStore {
    /// Open the store, creating its directory and table if needed
    pub fn open(options: &StoreOptions) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&options.dir_path).map_err(|e| StoreError::Open {
            path: options.dir_path.clone(),
            reason: e.to_string(),
        })?;

        let path = options.db_path();
        let conn = Connection::open(&path).map_err(|e| StoreError::Open {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        conn.execute(CREATE_TABLE, [])?;

        info!("Opened package store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Open a store that lives only as long as this handle
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the underlying connection, reporting any error
    pub fn close(self) -> Result<(), StoreError> {
        let conn = self.conn.into_inner().map_err(|_| StoreError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        debug!("Closed package store at {}", self.path.display());
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Store for SqliteStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn scan(&self, options: &ScanOptions) -> Result<Vec<KeyValue>, StoreError> {
        let conn = self.lock()?;
        let order = if options.reverse { "DESC" } else { "ASC" };
        let lower = options.prefix.clone().unwrap_or_default();
        let upper = prefix_successor(&lower);

        let sql = match upper {
            Some(_) => format!(
                "SELECT key, value FROM kv WHERE key >= ?1 AND key < ?2 ORDER BY key {}",
                order
            ),
            None => format!("SELECT key, value FROM kv WHERE key >= ?1 ORDER BY key {}", order),
        };

        let mut stmt = conn.prepare(&sql)?;
        let to_pair = |row: &rusqlite::Row<'_>| -> rusqlite::Result<KeyValue> {
            Ok(KeyValue {
                key: row.get(0)?,
                value: row.get(1)?,
            })
        };
        let rows = match &upper {
            Some(upper) => stmt.query_map(params![lower, upper], to_pair)?,
            None => stmt.query_map(params![lower], to_pair)?,
        };

        let mut pairs = Vec::new();
        for row in rows {
            pairs.push(row?);
        }
        Ok(pairs)
    }
}

/// Smallest key greater than every key starting with `prefix`
///
/// `None` when no such bound exists: an empty prefix or one made only of
/// `0xFF` bytes.
fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.pop() {
        if last < u8::MAX {
            upper.push(last + 1);
            return Some(upper);
        }
    }
    None
}
