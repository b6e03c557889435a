//! Fail-soft lookups into untrusted feed documents
//!
//! Feed payloads come from third-party firmware in many versions; any key
//! may be missing or carry an unexpected type. Every lookup here returns
//! `None` for anything that does not match the expected shape, so one
//! malformed field never disturbs its siblings.

use serde_json::Value;

/// Walk `path` through nested objects, returning the value at the end
pub fn get_path<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |value, key| value.get(key))
}

/// Look up a floating-point number at `path`
pub fn get_f64(doc: &Value, path: &[&str]) -> Option<f64> {
    get_path(doc, path)?.as_f64()
}

/// Look up an unsigned integer at `path`
pub fn get_u64(doc: &Value, path: &[&str]) -> Option<u64> {
    get_path(doc, path)?.as_u64()
}

/// Look up a string at `path`
pub fn get_str<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a str> {
    get_path(doc, path)?.as_str()
}

/// Iterate the string elements of an array value, skipping anything else
pub fn strings(value: &Value) -> impl Iterator<Item = &str> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.as_str())
}
