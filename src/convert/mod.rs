// src/convert/mod.rs
//! Manifest to package descriptor conversion
//!
//! The mapping rules live in `converter`. Everything here is deterministic:
//! object fields are always visited in field-name order and architectures in
//! key order, so converting the same manifest twice gives identical bytes.

mod converter;

pub use converter::{
    ConversionOptions, DEFAULT_PLATFORM, ManifestConverter, UNKNOWN_LICENSE, map_architecture,
    resolve_license, resolve_url,
};
