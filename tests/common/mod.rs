// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use nox_ingest::pipeline::{
    Aggregator, Pipeline, PipelineOptions, ProcessingRecord, RunContext, RunSummary,
    StageContext, discover_manifests,
};
use nox_ingest::progress::SilentReporter;
use nox_ingest::store::Store;
use nox_ingest::ManifestConverter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest from the conversion walkthrough: one 64-bit build, a homepage
/// and a single binary.
pub const FOO_MANIFEST: &str = r#"{
    "version": "1.2.3",
    "homepage": "http://example.com",
    "bin": ["app.exe"],
    "architecture": {
        "64bit": {"url": "http://x/y.zip", "hash": "deadbeef"}
    }
}"#;

/// Create a source directory populated with `(file name, contents)` pairs.
///
/// Keep the TempDir alive to prevent cleanup.
pub fn manifest_dir(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        std::fs::write(temp_dir.path().join(name), contents).unwrap();
    }
    temp_dir
}

/// Run the whole pipeline over `source_dir` against `store`.
pub fn run_pipeline(
    source_dir: &Path,
    store: &dyn Store,
    workers: usize,
    details_path: Option<PathBuf>,
) -> (RunSummary, Vec<ProcessingRecord>) {
    let files = discover_manifests(source_dir).unwrap();

    let stage = StageContext::new(store, ManifestConverter::with_defaults(), details_path.is_some());
    let aggregator = Aggregator::new(details_path, Box::new(SilentReporter::new()));
    let mut ctx = RunContext::new(stage, aggregator);

    Pipeline::new(PipelineOptions { workers }).run(&mut ctx, files).unwrap();
    ctx.aggregator.finish()
}

/// Find the record for `file_name`.
pub fn record_for<'a>(records: &'a [ProcessingRecord], file_name: &str) -> &'a ProcessingRecord {
    records
        .iter()
        .find(|record| record.file_name == file_name)
        .unwrap_or_else(|| panic!("no record for {}", file_name))
}
