//! Document value resolution.
//!
//! A parsed configuration document is an untyped `serde_json::Value`. These
//! helpers pick values out of it with the document-over-defaults precedence
//! and coerce them into the shapes the typed sections expect.

use serde_json::{Map, Value};

/// Whether a document value counts as "set".
///
/// Null, false, zero, empty strings, empty lists and empty mappings all count
/// as absent and fall through to the default. This means an explicit
/// `searchPaths: []` in a document cannot switch the default off.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Resolve `key` from the document, falling back to `defaults`.
///
/// Returns `None` only when neither side has a (non-null) value.
pub fn value_for<'a>(doc: Option<&'a Value>, key: &str, defaults: Option<&'a Value>) -> Option<&'a Value> {
    if let Some(value) = doc.and_then(|d| d.get(key))
        && is_truthy(value)
    {
        tracing::debug!(key, value = %value, "Got value from document");
        return Some(value);
    }

    defaults.and_then(|d| d.get(key)).filter(|v| !v.is_null())
}

/// The nested mapping under `key`, if the document has one.
///
/// A key holding anything other than a mapping is treated as absent.
pub fn section<'a>(doc: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    doc.and_then(|d| d.get(key)).filter(|v| v.is_object())
}

/// Render a scalar as a string. Lists and mappings have no string form.
pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerce a value into a list of strings; a bare scalar becomes a one-element list.
pub fn as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_string).collect(),
        other => as_string(other).into_iter().collect(),
    }
}

/// Shallow update: every key of `overlay` replaces the same key in `base`.
pub fn update(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}
