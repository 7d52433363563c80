// src/pipeline/mod.rs
//! Concurrent manifest ingestion
//!
//! ## Flow
//!
//! 1. `discover_manifests` lists the `*.json` files of the source directory
//! 2. every path is loaded into a bounded queue, which is then closed
//! 3. a pool of P workers drains the queue, each file handled end to end by
//!    `worker::process_file`
//! 4. records stream back to the calling thread, which aggregates them
//!    until the last worker drops its sender
//!
//! There is no ordering between files and no cancellation: a run always
//! covers the whole file set. Re-running over the same store is the only
//! form of resume, relying on the idempotency guard.

mod aggregate;
mod record;
mod worker;

pub use aggregate::{Aggregator, RunSummary};
pub use record::{Outcome, ProcessingRecord, STATUS_FIELD};
pub use worker::{OUTPUT_SUFFIX, output_path, package_name, process_file};

use crate::cache::DedupCache;
use crate::convert::ManifestConverter;
use crate::error::{Error, Result};
use crate::store::Store;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Default worker count: half the available parallelism, at least one
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

/// List the source manifests in `dir`, sorted by file name
///
/// Only regular `*.json` files directly inside `dir` are returned. Outputs
/// of earlier runs (`*_package.json`) are left out so a re-run does not
/// ingest them as sources.
pub fn discover_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| Error::SourceDir {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(".json") && !name.ends_with(OUTPUT_SUFFIX) {
            files.push(entry.into_path());
        }
    }

    debug!("Discovered {} manifests in {}", files.len(), dir.display());
    Ok(files)
}

/// State shared read-only by every worker of a run
pub struct StageContext<'s> {
    pub store: &'s dyn Store,
    pub cache: DedupCache,
    pub converter: ManifestConverter,
    /// Record observed field types when a manifest fails to decode
    pub diagnostics: bool,
}

impl<'s> StageContext<'s> {
    pub fn new(store: &'s dyn Store, converter: ManifestConverter, diagnostics: bool) -> Self {
        Self {
            store,
            cache: DedupCache::new(),
            converter,
            diagnostics,
        }
    }
}

/// Everything one run owns: the shared stage state and the aggregator
///
/// Built once at the entry point and passed into the pipeline.
pub struct RunContext<'s> {
    pub stage: StageContext<'s>,
    pub aggregator: Aggregator,
}

impl<'s> RunContext<'s> {
    pub fn new(stage: StageContext<'s>, aggregator: Aggregator) -> Self {
        Self { stage, aggregator }
    }
}

/// Options for the worker pool
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Number of parallel workers (at least 1)
    pub workers: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

/// Fixed-size worker pool driving the per-file sequence over a file set
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn workers(&self) -> usize {
        self.options.workers.max(1)
    }

    /// Process every path and feed the records to the context's aggregator
    ///
    /// Returns once all workers have drained the queue and every record
    /// has been aggregated. Per-file failures are reported in records; the
    /// only error is failing to start the pool.
    pub fn run(&self, ctx: &mut RunContext<'_>, files: Vec<PathBuf>) -> Result<()> {
        let workers = self.workers();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("nox-worker-{}", i))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        info!("Processing {} files with {} workers", files.len(), workers);

        let (queue_tx, queue_rx) = flume::bounded(files.len().max(1));
        for path in files {
            // Capacity covers every file and the receiver is alive
            let _ = queue_tx.send(path);
        }
        drop(queue_tx);

        let (result_tx, result_rx) = flume::unbounded();
        let RunContext { stage, aggregator } = ctx;
        let stage = &*stage;

        pool.in_place_scope(move |scope| {
            for worker_id in 0..workers {
                let queue = queue_rx.clone();
                let results = result_tx.clone();
                scope.spawn(move |_| worker::run_worker(worker_id, stage, queue, results));
            }
            drop(result_tx);
            aggregator.consume(result_rx);
        });

        Ok(())
    }
}
