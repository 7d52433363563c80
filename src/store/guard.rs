// src/store/guard.rs
//! First-writer-wins check against the store

use super::{Store, StoreError};
use tracing::debug;

/// Note recorded on a processing record when a package is skipped
pub const ALREADY_PRESENT_NOTE: &str = "already present in store";

/// Decides whether a package still needs to be converted
///
/// A package name that already has a value in the store is never converted
/// or written again.
pub struct IdempotencyGuard<'a> {
    store: &'a dyn Store,
}

impl<'a> IdempotencyGuard<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Returns true if `package_name` is already stored
    pub fn is_present(&self, package_name: &str) -> Result<bool, StoreError> {
        let present = self.store.contains(package_name.as_bytes())?;
        if present {
            debug!("Package {} already present, skipping", package_name);
        }
        Ok(present)
    }
}
