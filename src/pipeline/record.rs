// src/pipeline/record.rs
//! Per-file processing records

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Diagnostic key carrying a human-readable status note
pub const STATUS_FIELD: &str = "status";

/// How a file was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Decoded, converted and persisted
    Converted,
    /// Persisted from bytes already converted earlier in the run
    Cached,
    /// Skipped because the package name was already in the store
    AlreadyPresent,
    /// Any per-file error
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Converted => "converted",
            Outcome::Cached => "cached",
            Outcome::AlreadyPresent => "already_present",
            Outcome::Failed => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_micros() as f64 / 1000.0)
}

/// Result of processing one source file
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingRecord {
    pub file_name: String,
    pub success: bool,
    pub outcome: Outcome,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(rename = "processing_time_ms", serialize_with = "serialize_millis")]
    pub processing_time: Duration,

    /// Raw field name to observed JSON type, or a status note
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl ProcessingRecord {
    fn new(file_name: impl Into<String>, outcome: Outcome, processing_time: Duration) -> Self {
        Self {
            file_name: file_name.into(),
            success: outcome.is_success(),
            outcome,
            error_message: None,
            processing_time,
            fields: BTreeMap::new(),
        }
    }

    pub fn converted(file_name: impl Into<String>, processing_time: Duration) -> Self {
        Self::new(file_name, Outcome::Converted, processing_time)
    }

    pub fn cached(file_name: impl Into<String>, processing_time: Duration) -> Self {
        Self::new(file_name, Outcome::Cached, processing_time)
    }

    pub fn already_present(
        file_name: impl Into<String>,
        note: &str,
        processing_time: Duration,
    ) -> Self {
        let mut record = Self::new(file_name, Outcome::AlreadyPresent, processing_time);
        record.fields.insert(STATUS_FIELD.to_string(), note.to_string());
        record
    }

    pub fn failed(
        file_name: impl Into<String>,
        error_message: impl Into<String>,
        processing_time: Duration,
    ) -> Self {
        let mut record = Self::new(file_name, Outcome::Failed, processing_time);
        record.error_message = Some(error_message.into());
        record
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields.extend(fields);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_constructors_keep_success_consistent() {
        let d = Duration::from_millis(5);
        assert!(ProcessingRecord::converted("a.json", d).success);
        assert!(ProcessingRecord::cached("a.json", d).success);
        assert!(ProcessingRecord::already_present("a.json", "note", d).success);
        assert!(!ProcessingRecord::failed("a.json", "boom", d).success);
    }

    #[test]
    fn test_already_present_carries_note() {
        let record = ProcessingRecord::already_present("a.json", "skip", Duration::ZERO);
        assert_eq!(record.fields[STATUS_FIELD], "skip");
        assert_eq!(record.outcome, Outcome::AlreadyPresent);
    }

    #[test]
    fn test_serialize_record() {
        let mut fields = BTreeMap::new();
        fields.insert("version".to_string(), "number".to_string());
        let record = ProcessingRecord::failed("a.json", "bad", Duration::from_millis(2))
            .with_fields(fields);

        let value: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["file_name"], "a.json");
        assert_eq!(value["success"], false);
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["error_message"], "bad");
        assert_eq!(value["processing_time_ms"], 2.0);
        assert_eq!(value["fields"]["version"], "number");
    }

    #[test]
    fn test_serialize_omits_empty_parts() {
        let value: Value =
            serde_json::to_value(ProcessingRecord::converted("a.json", Duration::ZERO)).unwrap();
        assert!(value.get("error_message").is_none());
        assert!(value.get("fields").is_none());
    }
}
