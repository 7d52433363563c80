// src/progress.rs

//! Reporting of per-file results as they arrive
//!
//! The aggregator hands every processing record and the final summary to a
//! `RecordReporter`. Implementations include:
//! - `ConsoleReporter`: prints failures immediately and successes in debug mode
//! - `SilentReporter`: counts calls and prints nothing
//! - `CallbackReporter`: forwards events to a closure
//!
//! # Example
//!
//! ```ignore
//! use nox_ingest::progress::ConsoleReporter;
//!
//! let reporter = ConsoleReporter::new(debug);
//! let aggregator = Aggregator::new(None, Box::new(reporter));
//! ```

use crate::pipeline::{ProcessingRecord, RunSummary};
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives records in completion order and the summary at the end
///
/// Reporters are called from the aggregating thread only, but must be
/// `Send` so a run can be driven from any thread.
pub trait RecordReporter: Send {
    /// Called once per processed file
    fn on_record(&self, record: &ProcessingRecord);

    /// Called once after the result stream is drained
    fn on_finish(&self, summary: &RunSummary);
}

/// Console reporter for the command-line tool
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a console reporter; `verbose` also prints successes
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl RecordReporter for ConsoleReporter {
    fn on_record(&self, record: &ProcessingRecord) {
        if record.success {
            if self.verbose {
                println!("Processed {} ({})", record.file_name, record.outcome);
            }
        } else {
            println!(
                "Error processing {}: {}",
                record.file_name,
                record.error_message.as_deref().unwrap_or("unknown error")
            );
        }
    }

    fn on_finish(&self, summary: &RunSummary) {
        println!();
        println!(
            "Summary: {} files processed successfully ({} already present), {} errors",
            summary.succeeded, summary.skipped, summary.failed
        );
        println!(
            "Total time: {:?}, average per file: {:?}",
            summary.elapsed, summary.mean_per_file
        );
    }
}

/// Reporter that prints nothing
#[derive(Debug, Default)]
pub struct SilentReporter {
    records: AtomicU64,
    finished: std::sync::atomic::AtomicBool,
}

impl SilentReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records seen so far
    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

impl RecordReporter for SilentReporter {
    fn on_record(&self, _record: &ProcessingRecord) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    fn on_finish(&self, _summary: &RunSummary) {
        self.finished.store(true, Ordering::Relaxed);
    }
}

/// Events emitted by the callback reporter
#[derive(Debug, Clone)]
pub enum ReportEvent {
    /// One file finished
    Record(ProcessingRecord),
    /// The run finished
    Finished(RunSummary),
}

/// Callback-based reporter
///
/// Useful for tests and embedding the pipeline in other tools.
pub struct CallbackReporter<F>
where
    F: Fn(ReportEvent) + Send,
{
    callback: F,
}

impl<F> CallbackReporter<F>
where
    F: Fn(ReportEvent) + Send,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> RecordReporter for CallbackReporter<F>
where
    F: Fn(ReportEvent) + Send,
{
    fn on_record(&self, record: &ProcessingRecord) {
        (self.callback)(ReportEvent::Record(record.clone()));
    }

    fn on_finish(&self, summary: &RunSummary) {
        (self.callback)(ReportEvent::Finished(summary.clone()));
    }
}
