use serde_json::Value;

use crate::record::Record;

/// Flattens a list response into its records.
///
/// A bare array is returned as is, a paginated envelope yields its `results`
/// array, and any other shape degrades to an empty list.
pub fn normalize(body: Value) -> Vec<Record> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Parses and normalizes a raw response body. Empty and `null` bodies are
/// treated as "no data".
pub fn normalize_json(raw: &str) -> serde_json::Result<Vec<Record>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let body: Value = serde_json::from_str(trimmed)?;
    Ok(normalize(body))
}
