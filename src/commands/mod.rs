// src/commands/mod.rs
//! Command handlers for the nox-ingest CLI

use anyhow::{Context, Result};
use nox_ingest::pipeline::{
    Aggregator, Pipeline, PipelineOptions, RunContext, RunSummary, StageContext,
    discover_manifests,
};
use nox_ingest::progress::ConsoleReporter;
use nox_ingest::store::{SqliteStore, StoreOptions};
use nox_ingest::{ManifestConverter, RunConfig};
use tracing::info;

/// Ingest every manifest in the configured source directory
///
/// Only an unreadable source directory or an unopenable store fail the
/// command; per-file problems end up in the summary.
pub fn cmd_ingest(config: &RunConfig) -> Result<RunSummary> {
    let aggregator = Aggregator::new(
        config.details_output(),
        Box::new(ConsoleReporter::new(config.debug)),
    );

    let store = SqliteStore::open(&StoreOptions::new(&config.store_dir))
        .with_context(|| format!("Failed to open store at {}", config.store_dir.display()))?;
    info!("Opened store at {}", store.path().display());

    let files = discover_manifests(&config.source_dir).with_context(|| {
        format!(
            "Failed to read source directory {}",
            config.source_dir.display()
        )
    })?;

    let stage = StageContext::new(&store, ManifestConverter::with_defaults(), config.debug);
    let mut ctx = RunContext::new(stage, aggregator);

    Pipeline::new(PipelineOptions {
        workers: config.workers,
    })
    .run(&mut ctx, files)?;

    let RunContext { stage, aggregator } = ctx;
    drop(stage);
    let (summary, _records) = aggregator.finish();
    store.close()?;

    Ok(summary)
}
