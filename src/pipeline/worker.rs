// src/pipeline/worker.rs
//! Per-file processing
//!
//! Each worker pulls paths off the shared queue and runs the full sequence
//! for one file: read, then either a cache hit or a decode, the idempotency
//! check, convert, persist and write the output file. A package already in
//! the store is never written again on either path. Every error stops at
//! this boundary and becomes a failed record.

use super::StageContext;
use super::record::ProcessingRecord;
use crate::error::{Error, Result};
use crate::manifest::{SourceManifest, field_diagnostics};
use crate::store::{ALREADY_PRESENT_NOTE, IdempotencyGuard, file_key};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, trace};

/// Suffix appended to the file stem of each converted output
pub const OUTPUT_SUFFIX: &str = "_package.json";

/// Package name for a source file: its file name without the extension
pub fn package_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Where the converted descriptor for `path` is written
pub fn output_path(path: &Path) -> PathBuf {
    path.with_file_name(format!("{}{}", package_name(path), OUTPUT_SUFFIX))
}

/// What happened to a file that did not fail
enum Handled {
    Converted,
    Cached,
    AlreadyPresent,
}

/// Drain the work queue, sending one record per path
pub(crate) fn run_worker(
    worker_id: usize,
    ctx: &StageContext<'_>,
    queue: flume::Receiver<PathBuf>,
    results: flume::Sender<ProcessingRecord>,
) {
    debug!("Worker {} started", worker_id);
    let mut processed = 0usize;
    for path in queue.iter() {
        let record = process_file(ctx, &path);
        processed += 1;
        if results.send(record).is_err() {
            // Receiver gone, nobody is listening for further results
            break;
        }
    }
    debug!("Worker {} finished after {} files", worker_id, processed);
}

/// Process one source file into a record. Never fails the caller.
pub fn process_file(ctx: &StageContext<'_>, path: &Path) -> ProcessingRecord {
    let started = Instant::now();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut fields = BTreeMap::new();
    let result = handle_file(ctx, path, &file_name, &mut fields);
    let elapsed = started.elapsed();

    match result {
        Ok(Handled::Converted) => ProcessingRecord::converted(file_name, elapsed),
        Ok(Handled::Cached) => ProcessingRecord::cached(file_name, elapsed),
        Ok(Handled::AlreadyPresent) => {
            ProcessingRecord::already_present(file_name, ALREADY_PRESENT_NOTE, elapsed)
        }
        Err(e) => ProcessingRecord::failed(file_name, e.to_string(), elapsed).with_fields(fields),
    }
}

fn handle_file(
    ctx: &StageContext<'_>,
    path: &Path,
    file_name: &str,
    fields: &mut BTreeMap<String, String>,
) -> Result<Handled> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let package = package_name(path);
    let guard = IdempotencyGuard::new(ctx.store);

    if let Some(cached) = ctx.cache.get(path) {
        trace!("Cache hit for {}", path.display());
        if guard.is_present(&package)? {
            return Ok(Handled::AlreadyPresent);
        }
        persist(ctx, path, &package, file_name, &cached)?;
        return Ok(Handled::Cached);
    }

    let manifest = match SourceManifest::decode(&bytes) {
        Ok(manifest) => manifest,
        Err(e) => {
            if ctx.diagnostics {
                fields.extend(field_diagnostics(&bytes));
            }
            return Err(e);
        }
    };

    if guard.is_present(&package)? {
        return Ok(Handled::AlreadyPresent);
    }

    let descriptor = ctx.converter.convert(&package, &manifest);
    let data = descriptor.to_json_bytes()?;
    ctx.cache.set(path, data.clone());
    persist(ctx, path, &package, file_name, &data)?;

    Ok(Handled::Converted)
}

/// Write the descriptor under the package key, the file back-reference, and
/// the output file next to the source
fn persist(
    ctx: &StageContext<'_>,
    path: &Path,
    package: &str,
    file_name: &str,
    data: &[u8],
) -> Result<()> {
    ctx.store.put(package.as_bytes(), data)?;
    ctx.store
        .put(file_key(file_name).as_bytes(), package.as_bytes())?;

    let output = output_path(path);
    std::fs::write(&output, data).map_err(|e| Error::io(&output, e))?;
    debug!("Wrote {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ManifestConverter;
    use crate::pipeline::record::Outcome;
    use crate::store::{MemoryStore, Store};
    use tempfile::TempDir;

    fn context(store: &MemoryStore, diagnostics: bool) -> StageContext<'_> {
        StageContext::new(store, ManifestConverter::with_defaults(), diagnostics)
    }

    #[test]
    fn test_package_name_and_output_path() {
        let path = Path::new("/manifests/7zip.json");
        assert_eq!(package_name(path), "7zip");
        assert_eq!(output_path(path), PathBuf::from("/manifests/7zip_package.json"));
    }

    #[test]
    fn test_process_converts_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo.json");
        std::fs::write(&path, r#"{"version": "1.0", "bin": "foo.exe"}"#).unwrap();

        let store = MemoryStore::new();
        let ctx = context(&store, false);
        let record = process_file(&ctx, &path);

        assert!(record.success, "{:?}", record.error_message);
        assert_eq!(record.outcome, Outcome::Converted);
        assert_eq!(record.file_name, "foo.json");

        let stored = store.get(b"foo").unwrap().unwrap();
        assert_eq!(store.get(b"file:foo.json").unwrap(), Some(b"foo".to_vec()));
        assert_eq!(std::fs::read(temp_dir.path().join("foo_package.json")).unwrap(), stored);
        assert!(ctx.cache.contains(&path));
    }

    #[test]
    fn test_process_skips_present_package() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo.json");
        std::fs::write(&path, r#"{"version": "2.0"}"#).unwrap();

        let store = MemoryStore::new();
        store.put(b"foo", b"original").unwrap();

        let record = process_file(&context(&store, false), &path);
        assert!(record.success);
        assert_eq!(record.outcome, Outcome::AlreadyPresent);
        assert_eq!(record.fields["status"], ALREADY_PRESENT_NOTE);
        assert_eq!(store.get(b"foo").unwrap(), Some(b"original".to_vec()));
        assert!(!temp_dir.path().join("foo_package.json").exists());
    }

    #[test]
    fn test_process_uses_cache_when_absent_from_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo.json");
        std::fs::write(&path, "not even json").unwrap();

        let store = MemoryStore::new();
        let ctx = context(&store, false);
        ctx.cache.set(&path, b"{\"cached\": true}".to_vec());

        let record = process_file(&ctx, &path);
        assert_eq!(record.outcome, Outcome::Cached);
        assert_eq!(store.get(b"foo").unwrap(), Some(b"{\"cached\": true}".to_vec()));
    }

    #[test]
    fn test_process_cache_never_overwrites_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo.json");
        std::fs::write(&path, "{}").unwrap();

        let store = MemoryStore::new();
        store.put(b"foo", b"first").unwrap();
        let ctx = context(&store, false);
        ctx.cache.set(&path, b"second".to_vec());

        let record = process_file(&ctx, &path);
        assert_eq!(record.outcome, Outcome::AlreadyPresent);
        assert_eq!(store.get(b"foo").unwrap(), Some(b"first".to_vec()));
    }

    #[test]
    fn test_process_decodes_before_presence_check() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let store = MemoryStore::new();
        store.put(b"foo", b"original").unwrap();

        let record = process_file(&context(&store, true), &path);
        assert!(!record.success);
        assert_eq!(record.outcome, Outcome::Failed);
        assert!(record.error_message.is_some());
        assert_eq!(record.fields["$"], "array");
        assert!(!record.fields.contains_key("status"));
        assert_eq!(store.get(b"foo").unwrap(), Some(b"original".to_vec()));
    }

    #[test]
    fn test_process_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = MemoryStore::new();

        let record = process_file(&context(&store, true), &temp_dir.path().join("gone.json"));
        assert!(!record.success);
        assert_eq!(record.outcome, Outcome::Failed);
        assert!(record.error_message.unwrap().contains("gone.json"));
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_process_decode_failure_with_diagnostics() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, r#"{"version": 12, "bin": ["a"]}"#).unwrap();

        let store = MemoryStore::new();
        let record = process_file(&context(&store, true), &path);

        assert!(!record.success);
        assert_eq!(record.fields["version"], "number");
        assert_eq!(record.fields["bin"], "array");
        assert!(store.is_empty());
    }

    #[test]
    fn test_process_decode_failure_without_diagnostics() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let store = MemoryStore::new();
        let record = process_file(&context(&store, false), &path);

        assert!(!record.success);
        assert!(record.fields.is_empty());
    }
}
