// src/manifest/flexible.rs

//! Shape-tolerant decoders for manifest fields
//!
//! Source manifests are written by many hands and the same field can show up
//! as a string in one file and as a list or an object in the next. Each type
//! here deserializes the raw JSON value first and then probes a fixed,
//! ordered list of candidate shapes. The first shape that fits wins; when
//! nothing fits the decoder falls back to its empty variant instead of
//! failing the whole manifest.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::ops::Deref;

/// Try to read `value` as `T`, discarding the error on mismatch
fn probe<T: DeserializeOwned>(value: &Value) -> Option<T> {
    T::deserialize(value).ok()
}

/// A value that may be a string, an object, a boolean, a number or null
///
/// Candidates are tried in that order. Exactly one variant is always set;
/// arrays and any other unmatched shapes decode to `Null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlexibleValue {
    String(String),
    Object(Map<String, Value>),
    Bool(bool),
    Number(f64),
    #[default]
    Null,
}

impl FlexibleValue {
    /// Decode an already-parsed JSON value. Never fails.
    pub fn from_value(value: &Value) -> Self {
        if value.is_null() {
            return FlexibleValue::Null;
        }
        if let Some(s) = probe::<String>(value) {
            return FlexibleValue::String(s);
        }
        if let Some(obj) = probe::<Map<String, Value>>(value) {
            return FlexibleValue::Object(obj);
        }
        if let Some(b) = probe::<bool>(value) {
            return FlexibleValue::Bool(b);
        }
        if let Some(n) = probe::<f64>(value) {
            return FlexibleValue::Number(n);
        }
        FlexibleValue::Null
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlexibleValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            FlexibleValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FlexibleValue::Null)
    }

    /// Short name of the decoded variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            FlexibleValue::String(_) => "string",
            FlexibleValue::Object(_) => "object",
            FlexibleValue::Bool(_) => "boolean",
            FlexibleValue::Number(_) => "number",
            FlexibleValue::Null => "null",
        }
    }
}

impl<'de> Deserialize<'de> for FlexibleValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(FlexibleValue::from_value(&value))
    }
}

/// A list of strings that may also be written as a single bare string
///
/// `null` and any shape other than a string or an array of strings decode
/// to an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringList(Vec<String>);

impl StringList {
    pub fn from_value(value: &Value) -> Self {
        if value.is_null() {
            return StringList::default();
        }
        if let Some(s) = probe::<String>(value) {
            return StringList(vec![s]);
        }
        if let Some(list) = probe::<Vec<String>>(value) {
            return StringList(list);
        }
        StringList::default()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for StringList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for StringList {
    fn from(list: Vec<String>) -> Self {
        StringList(list)
    }
}

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(StringList::from_value(&value))
    }
}

/// A checksum field holding either one hash or a list of hashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlexibleHash {
    Single(String),
    Multiple(Vec<String>),
}

impl Default for FlexibleHash {
    fn default() -> Self {
        FlexibleHash::Single(String::new())
    }
}

impl FlexibleHash {
    pub fn from_value(value: &Value) -> Self {
        if value.is_null() {
            return FlexibleHash::default();
        }
        if let Some(s) = probe::<String>(value) {
            return FlexibleHash::Single(s);
        }
        if let Some(list) = probe::<Vec<String>>(value) {
            return FlexibleHash::Multiple(list);
        }
        FlexibleHash::default()
    }

    /// The hash to publish: the single value, or the first entry of a list
    pub fn primary(&self) -> Option<&str> {
        match self {
            FlexibleHash::Single(s) if !s.is_empty() => Some(s),
            FlexibleHash::Single(_) => None,
            FlexibleHash::Multiple(list) => list.first().map(String::as_str),
        }
    }
}

impl<'de> Deserialize<'de> for FlexibleHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(FlexibleHash::from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flexible_value_priority() {
        assert_eq!(
            FlexibleValue::from_value(&json!("MIT")),
            FlexibleValue::String("MIT".to_string())
        );
        assert!(matches!(
            FlexibleValue::from_value(&json!({"identifier": "MIT"})),
            FlexibleValue::Object(_)
        ));
        assert_eq!(
            FlexibleValue::from_value(&json!(true)),
            FlexibleValue::Bool(true)
        );
        assert_eq!(
            FlexibleValue::from_value(&json!(3)),
            FlexibleValue::Number(3.0)
        );
        assert_eq!(FlexibleValue::from_value(&json!(null)), FlexibleValue::Null);
    }

    #[test]
    fn test_flexible_value_unmatched_shape_is_null() {
        assert_eq!(
            FlexibleValue::from_value(&json!(["a", "b"])),
            FlexibleValue::Null
        );
        assert_eq!(FlexibleValue::from_value(&json!([])), FlexibleValue::Null);
    }

    #[test]
    fn test_flexible_value_always_one_kind() {
        let inputs = [
            json!("x"),
            json!({}),
            json!({"a": [1, 2]}),
            json!(false),
            json!(-1.5),
            json!(null),
            json!([1, "two", null]),
        ];
        for input in &inputs {
            let kind = FlexibleValue::from_value(input).kind();
            assert!(
                ["string", "object", "boolean", "number", "null"].contains(&kind),
                "unexpected kind {} for {}",
                kind,
                input
            );
        }
    }

    #[test]
    fn test_flexible_value_deserialize_inside_struct() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default)]
            license: FlexibleValue,
        }

        let holder: Holder = serde_json::from_str(r#"{"license": [1, 2]}"#).unwrap();
        assert!(holder.license.is_null());

        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert!(holder.license.is_null());
    }

    #[test]
    fn test_string_list_shapes() {
        assert!(StringList::from_value(&json!(null)).is_empty());
        assert_eq!(&*StringList::from_value(&json!("x")), &["x".to_string()]);
        assert_eq!(
            StringList::from_value(&json!(["a", "b"])).into_inner(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(StringList::from_value(&json!(42)).is_empty());
        assert!(StringList::from_value(&json!({"a": "b"})).is_empty());
        assert!(StringList::from_value(&json!(["a", 1])).is_empty());
        assert!(StringList::from_value(&json!([["nested"]])).is_empty());
    }

    #[test]
    fn test_flexible_hash_shapes() {
        assert_eq!(
            FlexibleHash::from_value(&json!("abc")),
            FlexibleHash::Single("abc".to_string())
        );
        assert_eq!(
            FlexibleHash::from_value(&json!(["abc", "def"])),
            FlexibleHash::Multiple(vec!["abc".to_string(), "def".to_string()])
        );
        assert_eq!(FlexibleHash::from_value(&json!(null)), FlexibleHash::default());
        assert_eq!(FlexibleHash::from_value(&json!(7)), FlexibleHash::default());
    }

    #[test]
    fn test_flexible_hash_primary() {
        assert_eq!(FlexibleHash::from_value(&json!("abc")).primary(), Some("abc"));
        assert_eq!(
            FlexibleHash::from_value(&json!(["abc", "def"])).primary(),
            Some("abc")
        );
        assert_eq!(FlexibleHash::Multiple(vec![]).primary(), None);
        assert_eq!(FlexibleHash::default().primary(), None);
    }
}
