//! JSON argument helpers for function and trait-based tools.
//!
//! ```rust
//! use gtooling::{object_args, optional_usize, required_string};
//! use serde_json::json;
//!
//! let args = json!({"query": "rust", "video_limit": 5.0});
//! let args = object_args(&args).expect("object should parse");
//! assert_eq!(required_string(&args, "query").expect("query"), "rust");
//! assert_eq!(optional_usize(&args, "video_limit"), Some(5));
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

/// Arguments as an object; a missing (`null`) argument set counts as empty.
pub fn object_args(args: &Value) -> Result<Map<String, Value>, ToolError> {
    match args {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    optional_string(args, key)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

/// Non-blank string argument, trimmed.
pub fn optional_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// Positive integer argument; fractional numbers are truncated and zero counts as absent.
pub fn optional_usize(args: &Map<String, Value>, key: &str) -> Option<usize> {
    let value = args.get(key).and_then(numeric_value)?;
    if value.is_finite() && value >= 1.0 {
        Some(value as usize)
    } else {
        None
    }
}

pub fn optional_bool(args: &Map<String, Value>, key: &str) -> Option<bool> {
    match args.get(key)? {
        Value::Bool(value) => Some(*value),
        Value::String(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Number or numeric string as `f64`.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|parsed| parsed.is_finite()),
        _ => None,
    }
}

/// Field names of the first record, in record order.
pub fn available_fields(records: &[Value]) -> Vec<String> {
    records
        .first()
        .and_then(Value::as_object)
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default()
}

/// Maps a requested field name onto the records' actual key.
///
/// Exact matches win; otherwise keys are compared ignoring case, whitespace, `_`, and `-`.
/// Unresolvable names are returned unchanged so callers can report them.
pub fn resolve_field(records: &[Value], field: &str) -> String {
    let keys = available_fields(records);
    if keys.is_empty() || keys.iter().any(|key| key == field) {
        return field.to_string();
    }

    let target = normalize_field(field);
    keys.into_iter()
        .find(|key| normalize_field(key) == target)
        .unwrap_or_else(|| field.to_string())
}

fn normalize_field(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
