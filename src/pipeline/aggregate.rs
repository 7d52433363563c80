// src/pipeline/aggregate.rs
//! Result aggregation
//!
//! Drains the result stream, tallies outcomes and keeps every record in
//! arrival order. In diagnostics mode the full record list is also written
//! out as a JSON array once the stream closes.

use super::record::{Outcome, ProcessingRecord};
use crate::progress::RecordReporter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Records marked successful, skips included
    pub succeeded: usize,
    /// Successful records that were skipped as already present
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
    /// `elapsed` divided by the number of records, zero when there were none
    pub mean_per_file: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Collects processing records for one run
pub struct Aggregator {
    started: Instant,
    records: Vec<ProcessingRecord>,
    succeeded: usize,
    skipped: usize,
    failed: usize,
    /// Where to write the full record list, if diagnostics are on
    details_path: Option<PathBuf>,
    reporter: Box<dyn RecordReporter>,
}

impl Aggregator {
    /// Create an aggregator; the run clock starts now
    pub fn new(details_path: Option<PathBuf>, reporter: Box<dyn RecordReporter>) -> Self {
        Self::started_at(Instant::now(), details_path, reporter)
    }

    /// Create an aggregator whose run clock started at `started`
    pub fn started_at(
        started: Instant,
        details_path: Option<PathBuf>,
        reporter: Box<dyn RecordReporter>,
    ) -> Self {
        Self {
            started,
            records: Vec::new(),
            succeeded: 0,
            skipped: 0,
            failed: 0,
            details_path,
            reporter,
        }
    }

    /// Tally one record
    pub fn record(&mut self, record: ProcessingRecord) {
        if record.success {
            self.succeeded += 1;
            if record.outcome == Outcome::AlreadyPresent {
                self.skipped += 1;
            }
            info!(
                "{}: {} in {:?}",
                record.file_name, record.outcome, record.processing_time
            );
        } else {
            self.failed += 1;
            warn!(
                "{}: failed in {:?}: {}",
                record.file_name,
                record.processing_time,
                record.error_message.as_deref().unwrap_or("unknown error")
            );
        }

        self.reporter.on_record(&record);
        self.records.push(record);
    }

    /// Consume records until every sender has been dropped
    pub fn consume(&mut self, results: flume::Receiver<ProcessingRecord>) {
        for record in results.iter() {
            self.record(record);
        }
    }

    pub fn records(&self) -> &[ProcessingRecord] {
        &self.records
    }

    /// Compute the summary, write the details artifact if requested, and
    /// return the summary together with all records
    pub fn finish(self) -> (RunSummary, Vec<ProcessingRecord>) {
        let elapsed = self.started.elapsed();
        let total = self.succeeded + self.failed;
        let mean_per_file = if total == 0 {
            Duration::ZERO
        } else {
            elapsed / total as u32
        };

        let summary = RunSummary {
            succeeded: self.succeeded,
            skipped: self.skipped,
            failed: self.failed,
            elapsed,
            mean_per_file,
        };

        if let Some(path) = &self.details_path {
            match write_details(path, &self.records) {
                Ok(()) => info!("Wrote processing details to {}", path.display()),
                Err(e) => warn!("Failed to write processing details to {}: {}", path.display(), e),
            }
        }

        info!(
            "Run finished: {} succeeded ({} already present), {} failed, {:?} total",
            summary.succeeded, summary.skipped, summary.failed, summary.elapsed
        );
        self.reporter.on_finish(&summary);
        (summary, self.records)
    }
}

fn write_details(path: &Path, records: &[ProcessingRecord]) -> crate::Result<()> {
    let bytes = serde_json::to_vec_pretty(records).map_err(crate::Error::Serialize)?;
    std::fs::write(path, bytes).map_err(|e| crate::Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use serde_json::Value;
    use tempfile::TempDir;

    fn silent(details_path: Option<PathBuf>) -> Aggregator {
        Aggregator::new(details_path, Box::new(SilentReporter::new()))
    }

    #[test]
    fn test_tallies() {
        let mut aggregator = silent(None);
        aggregator.record(ProcessingRecord::converted("a.json", Duration::ZERO));
        aggregator.record(ProcessingRecord::already_present("b.json", "x", Duration::ZERO));
        aggregator.record(ProcessingRecord::failed("c.json", "bad", Duration::ZERO));

        let (summary, records) = aggregator.finish();
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].file_name, "c.json");
    }

    #[test]
    fn test_empty_run_has_zero_mean() {
        let (summary, records) = silent(None).finish();
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.mean_per_file, Duration::ZERO);
        assert!(records.is_empty());
    }

    #[test]
    fn test_mean_per_file() {
        let started = Instant::now() - Duration::from_millis(100);
        let mut aggregator =
            Aggregator::started_at(started, None, Box::new(SilentReporter::new()));
        aggregator.record(ProcessingRecord::converted("a.json", Duration::ZERO));
        aggregator.record(ProcessingRecord::converted("b.json", Duration::ZERO));

        let (summary, _) = aggregator.finish();
        assert!(summary.elapsed >= Duration::from_millis(100));
        assert_eq!(summary.mean_per_file, summary.elapsed / 2);
    }

    #[test]
    fn test_consume_until_closed() {
        let (tx, rx) = flume::unbounded();
        for i in 0..5 {
            tx.send(ProcessingRecord::converted(format!("{}.json", i), Duration::ZERO))
                .unwrap();
        }
        drop(tx);

        let mut aggregator = silent(None);
        aggregator.consume(rx);
        assert_eq!(aggregator.records().len(), 5);
    }

    #[test]
    fn test_details_artifact_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("details.json");

        let mut aggregator = silent(Some(path.clone()));
        aggregator.record(ProcessingRecord::failed("a.json", "bad", Duration::ZERO));
        aggregator.finish();

        let value: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["file_name"], "a.json");
        assert_eq!(records[0]["success"], false);
    }

    #[test]
    fn test_details_write_failure_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("details.json");

        let mut aggregator = silent(Some(path.clone()));
        aggregator.record(ProcessingRecord::converted("a.json", Duration::ZERO));
        let (summary, _) = aggregator.finish();

        assert_eq!(summary.succeeded, 1);
        assert!(!path.exists());
    }
}
