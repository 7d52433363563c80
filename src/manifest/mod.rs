// src/manifest/mod.rs
//! Source manifest decoding
//!
//! Third-party manifests arrive as JSON whose fields change shape from file
//! to file. `flexible` holds the per-field decoders; `source` holds the
//! manifest model built on top of them and the diagnostics used when a
//! document cannot be decoded at all.

pub mod flexible;
pub mod source;

pub use flexible::{FlexibleHash, FlexibleValue, StringList};
pub use source::{
    ArchitectureEntry, ROOT_DIAGNOSTIC_KEY, SourceManifest, field_diagnostics, json_type_name,
};
