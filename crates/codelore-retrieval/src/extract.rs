//! Field extraction over loosely-shaped backend responses.
//!
//! Backends disagree on where a field lives (top level, nested payload,
//! nested metadata). Normalization is expressed as an ordered list of
//! accessor attempts per field, so the fallback chain is visible in one
//! place and testable in isolation.

use std::collections::HashMap;

use serde_json::Value;

/// Walk a path of object keys.
fn pluck<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

/// First string found along the candidate paths.
pub fn first_str(value: &Value, candidates: &[&[&str]]) -> Option<String> {
    candidates.iter().find_map(|path| {
        pluck(value, path)
            .and_then(Value::as_str)
            .map(str::to_string)
    })
}

/// First number found along the candidate paths, as f32.
pub fn first_f32(value: &Value, candidates: &[&[&str]]) -> Option<f32> {
    candidates
        .iter()
        .find_map(|path| pluck(value, path).and_then(Value::as_f64))
        .map(|n| n as f32)
}

/// First non-negative integer found along the candidate paths, as u32.
pub fn first_u32(value: &Value, candidates: &[&[&str]]) -> Option<u32> {
    candidates
        .iter()
        .find_map(|path| pluck(value, path).and_then(Value::as_u64))
        .and_then(|n| u32::try_from(n).ok())
}

/// First non-negative integer found along the candidate paths, as u64.
pub fn first_u64(value: &Value, candidates: &[&[&str]]) -> Option<u64> {
    candidates
        .iter()
        .find_map(|path| pluck(value, path).and_then(Value::as_u64))
}

/// First object found along the candidate paths, as an owned map.
pub fn first_object(value: &Value, candidates: &[&[&str]]) -> Option<HashMap<String, Value>> {
    candidates.iter().find_map(|path| {
        pluck(value, path).and_then(Value::as_object).map(|obj| {
            obj.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
    })
}
