//! JSON decoding with recursive flattening, and pretty-printed encoding.

use super::FlatMap;
use crate::Result;
use serde_json::Value;

/// Parses a JSON document and flattens it into a flat map.
pub fn decode(text: &str) -> Result<FlatMap> {
    let value: Value = serde_json::from_str(text)?;
    let mut out = FlatMap::new();
    flatten(&value, None, &mut out);
    Ok(out)
}

/// Serializes a flat map as a pretty-printed JSON object.
pub fn encode(data: &FlatMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Flattens a JSON value into string pairs.
///
/// Mapping keys join their parent with `_`; sequence elements use the
/// zero-based index. A null document flattens to `{"": ""}`.
pub(crate) fn flatten(value: &Value, prefix: Option<&str>, out: &mut FlatMap) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = join_key(prefix, key);
                flatten(child, Some(&key), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let key = join_key(prefix, &index.to_string());
                flatten(child, Some(&key), out);
            }
        }
        leaf => {
            out.insert(prefix.unwrap_or("").to_string(), scalar_to_string(leaf));
        }
    }
}

/// Canonical string form of a scalar; null becomes the empty string.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn join_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(p) => format!("{p}_{key}"),
        None => key.to_string(),
    }
}
