// src/convert/converter.rs
//! Source manifest to package descriptor converter
//!
//! Takes a decoded `SourceManifest` and the package name derived from its
//! file name and builds a `PackageDescriptor`. Conversion is pure: no I/O,
//! and the same input always yields the same descriptor.

use crate::descriptor::{CommandSet, Meta, PackageDescriptor, Platform, PlatformHash, Source};
use crate::manifest::{ArchitectureEntry, FlexibleValue, SourceManifest};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Platform key used for any architecture that is not 32 or 64 bit
pub const DEFAULT_PLATFORM: &str = "windows";

/// License reported when the manifest only says `"license": true`
pub const UNKNOWN_LICENSE: &str = "Unknown";

/// Options for manifest conversion
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Author recorded in every descriptor's metadata
    pub author: String,
    /// Hash algorithm label attached to every platform hash
    pub hash_type: String,
    /// Source type used when the manifest has a homepage
    pub source_type: String,
    /// Environment variable naming the install directory in generated commands
    pub install_dir_var: String,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            author: "Scoop Team".to_string(),
            hash_type: "sha256".to_string(),
            source_type: "web".to_string(),
            install_dir_var: "INSTALL_DIR".to_string(),
        }
    }
}

/// Converts source manifests into canonical package descriptors
#[derive(Debug, Clone, Default)]
pub struct ManifestConverter {
    options: ConversionOptions,
}

impl ManifestConverter {
    /// Create a new converter with the given options
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    /// Create a converter with default options
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert a source manifest into a package descriptor
    pub fn convert(&self, package_name: &str, source: &SourceManifest) -> PackageDescriptor {
        let mut descriptor = PackageDescriptor::new(package_name, source.version.clone());
        descriptor.description = source.description.clone();

        let (platforms, arch) = self.build_platforms(package_name, source);
        descriptor.platforms = platforms;
        descriptor.arch = arch;

        if !source.homepage.is_empty() {
            descriptor.source = Some(Source {
                source_type: self.options.source_type.clone(),
                url: source.homepage.clone(),
            });
        }

        descriptor.preinstall = CommandSet {
            commands: source.pre_install.to_vec(),
            env: BTreeMap::new(),
        };
        descriptor.install = CommandSet {
            commands: source
                .bin
                .iter()
                .map(|bin| self.install_command(bin))
                .collect(),
            env: BTreeMap::new(),
        };

        descriptor.meta = Meta {
            author: self.options.author.clone(),
            license: resolve_license(&source.license),
            homepage: (!source.homepage.is_empty()).then(|| source.homepage.clone()),
        };

        descriptor
    }

    /// Build the platform table and the architecture tag list
    ///
    /// Architectures are visited in key order. Unrecognized keys all share
    /// the default platform entry, so the last one visited wins.
    fn build_platforms(
        &self,
        package_name: &str,
        source: &SourceManifest,
    ) -> (BTreeMap<String, Platform>, Vec<String>) {
        let mut platforms = BTreeMap::new();
        let mut arch = Vec::new();

        for (arch_key, entry) in &source.architecture {
            let (platform_key, tag) = map_architecture(arch_key);
            if let Some(tag) = tag {
                arch.push(tag.to_string());
            }

            let platform = self.build_platform(&source.version, entry);
            if platforms.insert(platform_key.to_string(), platform).is_some() {
                debug!(
                    "{}: architecture '{}' replaces an earlier entry for platform '{}'",
                    package_name, arch_key, platform_key
                );
            }
        }

        (platforms, arch)
    }

    fn build_platform(&self, version: &str, entry: &ArchitectureEntry) -> Platform {
        Platform {
            version: version.to_string(),
            url: resolve_url(&entry.url).unwrap_or_default(),
            hash: PlatformHash {
                hash_type: self.options.hash_type.clone(),
                value: entry.hash.primary().unwrap_or_default().to_string(),
            },
        }
    }

    fn install_command(&self, bin: &str) -> String {
        format!("cp {} ${}/", bin, self.options.install_dir_var)
    }
}

/// Map a source architecture key to its platform key and architecture tag
pub fn map_architecture(arch_key: &str) -> (&'static str, Option<&'static str>) {
    match arch_key {
        "64bit" => ("windows-x64", Some("x64")),
        "32bit" => ("windows-x86", Some("x86")),
        _ => (DEFAULT_PLATFORM, None),
    }
}

/// The string value whose field name sorts first
fn first_string_field(obj: &Map<String, Value>) -> Option<&str> {
    obj.iter()
        .filter_map(|(key, value)| value.as_str().map(|s| (key, s)))
        .min_by(|a, b| a.0.cmp(b.0))
        .map(|(_, s)| s)
}

/// Resolve a download URL
///
/// A string is used as-is. For an object, the first string-valued field in
/// field-name order is used.
pub fn resolve_url(url: &FlexibleValue) -> Option<String> {
    match url {
        FlexibleValue::String(s) => Some(s.clone()),
        FlexibleValue::Object(obj) => first_string_field(obj).map(str::to_string),
        _ => None,
    }
}

/// Resolve the license identifier
///
/// Objects prefer a string `identifier` field, then the first string-valued
/// field in field-name order. `true` means a license exists but is not
/// named; `false` and `null` leave the license unset.
pub fn resolve_license(license: &FlexibleValue) -> Option<String> {
    match license {
        FlexibleValue::String(s) => Some(s.clone()),
        FlexibleValue::Object(obj) => obj
            .get("identifier")
            .and_then(|v| v.as_str())
            .or_else(|| first_string_field(obj))
            .map(str::to_string),
        FlexibleValue::Bool(true) => Some(UNKNOWN_LICENSE.to_string()),
        FlexibleValue::Bool(false) => None,
        FlexibleValue::Number(n) => Some(n.to_string()),
        FlexibleValue::Null => None,
    }
}
