//! Defensive field access over loosely-shaped API records.
//!
//! The backend serializes the same logical attribute under different names
//! depending on the endpoint (`user_name` vs `user`, `total_points` vs
//! `points`, ...). Every read goes through an ordered candidate key list; the
//! first key that is present with a non-null value wins. Missing keys are a
//! normal condition and never an error.

use serde_json::Value;

/// One entity as returned by the API. No schema is enforced.
pub type Record = Value;

/// Placeholder shown when no candidate key resolves.
pub const NOT_AVAILABLE: &str = "N/A";

/// Returns the value of the first candidate key that is present and not
/// `null`. `0`, `false` and `""` count as present.
pub fn resolve<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

pub fn resolve_or<'a>(record: &'a Record, keys: &[&str], default: &'a Value) -> &'a Value {
    resolve(record, keys).unwrap_or(default)
}

pub fn resolve_text(record: &Record, keys: &[&str]) -> Option<String> {
    resolve(record, keys).map(value_text)
}

pub fn resolve_text_or(record: &Record, keys: &[&str], default: &str) -> String {
    resolve_text(record, keys).unwrap_or_else(|| default.to_string())
}

/// Numeric read that also accepts numeric strings and counts arrays.
pub fn resolve_count(record: &Record, keys: &[&str]) -> Option<u64> {
    let value = resolve(record, keys)?;
    match value {
        Value::Number(num) => num
            .as_u64()
            .or_else(|| num.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Array(items) => Some(items.len() as u64),
        _ => None,
    }
}

/// Display text for a JSON value: strings verbatim, everything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => NOT_AVAILABLE.to_string(),
        other => other.to_string(),
    }
}
