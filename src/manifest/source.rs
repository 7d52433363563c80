// src/manifest/source.rs

//! Source manifest model
//!
//! Field-level shape mismatches are absorbed by the flexible decoders. A
//! manifest only fails to decode when the document itself, or one of the
//! plain string and mapping fields, has a shape nothing can absorb.

use super::flexible::{FlexibleHash, FlexibleValue, StringList};
use crate::error::{Error, Result};
use serde::de::Unexpected;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key used in field diagnostics when the document is not a JSON object
pub const ROOT_DIAGNOSTIC_KEY: &str = "$";

/// Treat an explicit `null` the same as a missing field
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like [`nullable`], and also accepts `null` for individual entries
fn architecture_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, ArchitectureEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<BTreeMap<String, Option<ArchitectureEntry>>> =
        Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|(arch, entry)| (arch, entry.unwrap_or_default()))
        .collect())
}

/// A loosely-typed third-party package manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceManifest {
    #[serde(default, deserialize_with = "nullable")]
    pub version: String,

    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    #[serde(default, deserialize_with = "nullable")]
    pub homepage: String,

    #[serde(default)]
    pub license: FlexibleValue,

    /// Keyed by architecture name ("64bit", "32bit", ...), ordered by key
    #[serde(default, deserialize_with = "architecture_map")]
    pub architecture: BTreeMap<String, ArchitectureEntry>,

    #[serde(default)]
    pub extract_dir: StringList,

    #[serde(default)]
    pub pre_install: StringList,

    #[serde(default)]
    pub bin: StringList,

    #[serde(default)]
    pub checkver: FlexibleValue,

    /// Carried through decoding but not used by conversion
    #[serde(default, deserialize_with = "nullable")]
    pub autoupdate: BTreeMap<String, Value>,
}

/// Download details for one architecture
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchitectureEntry {
    #[serde(default)]
    pub url: FlexibleValue,

    #[serde(default)]
    pub hash: FlexibleHash,
}

impl SourceManifest {
    /// Decode a manifest from raw file bytes
    ///
    /// The document must be a JSON object; serde would otherwise accept an
    /// array positionally for a struct.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(Error::Decode)?;
        if !value.is_object() {
            return Err(Error::Decode(serde::de::Error::invalid_type(
                unexpected(&value),
                &"a manifest object",
            )));
        }
        serde_json::from_value(value).map_err(Error::Decode)
    }

    /// Parse a manifest from a JSON string
    pub fn parse(content: &str) -> Result<Self> {
        Self::decode(content.as_bytes())
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// JSON type name of a value, as reported in diagnostics
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Map each top-level field of a document to the JSON type observed for it
///
/// Used after a decode failure to show which fields had unexpected shapes.
/// A document that is not an object yields one entry under
/// [`ROOT_DIAGNOSTIC_KEY`] naming the root type, or `invalid` when the bytes
/// are not JSON at all.
pub fn field_diagnostics(bytes: &[u8]) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => {
            for (key, value) in &map {
                fields.insert(key.clone(), json_type_name(value).to_string());
            }
        }
        Ok(other) => {
            fields.insert(
                ROOT_DIAGNOSTIC_KEY.to_string(),
                json_type_name(&other).to_string(),
            );
        }
        Err(_) => {
            fields.insert(ROOT_DIAGNOSTIC_KEY.to_string(), "invalid".to_string());
        }
    }
    fields
}
