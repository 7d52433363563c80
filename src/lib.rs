// src/lib.rs

//! Nox manifest ingestion
//!
//! Normalizes a directory of loosely-typed third-party package manifests
//! into canonical package descriptors and persists them in an embedded
//! ordered key-value store.
//!
//! # Architecture
//!
//! - Shape-tolerant decoding: fields that change type between files are
//!   probed against a fixed list of shapes instead of failing the manifest
//! - Deterministic conversion: the same manifest always yields the same bytes
//! - First writer wins: a package already in the store is never rewritten
//! - Fan-out/fan-in: a fixed worker pool drains a closed queue and streams
//!   one record per file back to a single aggregator

pub mod cache;
pub mod config;
pub mod convert;
pub mod descriptor;
mod error;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod progress;
pub mod store;

pub use cache::DedupCache;
pub use config::RunConfig;
pub use convert::{ConversionOptions, ManifestConverter};
pub use descriptor::PackageDescriptor;
pub use error::{Error, Result};
pub use manifest::{FlexibleHash, FlexibleValue, SourceManifest, StringList};
pub use pipeline::{
    Aggregator, Outcome, Pipeline, PipelineOptions, ProcessingRecord, RunContext, RunSummary,
    StageContext, discover_manifests,
};
pub use progress::{CallbackReporter, ConsoleReporter, RecordReporter, SilentReporter};
pub use store::{IdempotencyGuard, MemoryStore, ScanOptions, SqliteStore, Store, StoreOptions};
