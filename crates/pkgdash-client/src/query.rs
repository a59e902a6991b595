//! Query-string serialization.
//!
//! Array-valued parameters repeat their key (`distros=a&distros=b`); the
//! backend rejects comma-joined and indexed (`distros[0]=a`) forms. Absent
//! values are omitted and nested maps use bracket keys (`filter[name]=x`).

use crate::error::{ClientError, Result};
use serde::Serialize;
use serde_json::Value;

/// Flatten a parameter payload into ordered query pairs.
///
/// The payload must serialize to a map, or to nothing at all.
pub fn to_query_pairs<P: Serialize + ?Sized>(params: &P) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(params).map_err(|e| ClientError::Params(e.to_string()))?;
    let mut pairs = Vec::new();
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                flatten(&key, value, &mut pairs);
            }
        }
        other => {
            return Err(ClientError::Params(format!(
                "query parameters must be a map, got {}",
                kind(&other)
            )));
        }
    }
    Ok(pairs)
}

fn flatten(key: &str, value: Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key.to_string(), b.to_string())),
        Value::Number(n) => out.push((key.to_string(), n.to_string())),
        Value::String(s) => out.push((key.to_string(), s)),
        Value::Array(items) => {
            for item in items {
                flatten(key, item, out);
            }
        }
        Value::Object(map) => {
            for (sub, value) in map {
                flatten(&format!("{key}[{sub}]"), value, out);
            }
        }
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}
