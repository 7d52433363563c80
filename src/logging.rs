// src/logging.rs
//! Tracing setup for the command-line tools
//!
//! Two sinks: the console (stderr, filtered by `RUST_LOG`) and the
//! line-oriented processing log file, which always records one line per
//! processed file.

use crate::config::RunConfig;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

fn console_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }))
}

fn file_filter(debug: bool) -> EnvFilter {
    EnvFilter::new(if debug { "debug" } else { "info" })
}

/// Install the global subscriber for an ingest run
///
/// If the processing log cannot be created the run continues with console
/// logging only.
pub fn init_logging(config: &RunConfig) {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter(config.debug));

    let (file_layer, open_error) = match File::create(&config.log_path) {
        Ok(file) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(file_filter(config.debug)),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    let installed = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .is_ok();

    if let (true, Some(e)) = (installed, open_error) {
        tracing::warn!(
            "Could not create processing log {}: {}",
            config.log_path.display(),
            e
        );
    }
}

/// Console-only logging for auxiliary tools
pub fn init_console_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(console_filter(false))
        .try_init();
}
