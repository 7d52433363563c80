// src/descriptor.rs

//! Canonical package descriptor
//!
//! The fixed-shape output format every source manifest is normalized into.
//! Serialized as pretty JSON; empty optional parts are left out.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Package kind written for every converted manifest
pub const PACKAGE_TYPE_PROGRAM: &str = "program";

/// Root of a converted package descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,

    #[serde(rename = "type")]
    pub package_type: String,

    /// Keyed by platform ("windows-x64", "windows-x86", "windows")
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub platforms: BTreeMap<String, Platform>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arch: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    #[serde(default)]
    pub preinstall: CommandSet,

    #[serde(default)]
    pub install: CommandSet,

    #[serde(default)]
    pub uninstall: CommandSet,

    #[serde(default)]
    pub postinstall: CommandSet,

    pub meta: Meta,
}

impl PackageDescriptor {
    /// Create an empty descriptor of type "program"
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            package_type: PACKAGE_TYPE_PROGRAM.to_string(),
            platforms: BTreeMap::new(),
            arch: Vec::new(),
            source: None,
            preinstall: CommandSet::default(),
            install: CommandSet::default(),
            uninstall: CommandSet::default(),
            postinstall: CommandSet::default(),
            meta: Meta::default(),
        }
    }

    /// Serialize to the bytes written to the store and the output file
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(Error::Serialize)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Error::Decode)
    }
}

/// Download target for one platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    #[serde(default)]
    pub hash: PlatformHash,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformHash {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub hash_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

/// Where the package comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: String,

    pub url: String,
}

/// Commands run during one lifecycle phase, with their environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub author: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}
