//! Tree shape utilities: deep clone, deep key sort, and flat/tree detection
//! with import-time normalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::set;

/// Key ordering for sorted views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Sort `items` in place in this order.
    pub fn sort<T: Ord>(self, items: &mut [T]) {
        items.sort();
        if self == SortOrder::Desc {
            items.reverse();
        }
    }
}

/// Shape of a loaded object: nested tree, or a flat map of dotted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Flat,
    Tree,
}

/// Structural copy sharing no mutable state with `value`.
///
/// `serde_json::Value` only holds JSON data, so a plain clone is already a
/// faithful deep copy; there is nothing like functions or `undefined` to lose.
pub fn clone_deep(value: &Value) -> Value {
    value.clone()
}

/// Recursively sort object keys; array element order is left untouched.
///
/// # Example
///
/// ```
/// use json_merge_path::{sort_json_deep, SortOrder};
/// use serde_json::json;
///
/// let sorted = sort_json_deep(&json!({"b": 1, "a": [{"d": 1, "c": 2}]}), SortOrder::Asc);
/// assert_eq!(sorted.to_string(), r#"{"a":[{"c":2,"d":1}],"b":1}"#);
/// ```
pub fn sort_json_deep(value: &Value, order: SortOrder) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|v| sort_json_deep(v, order)).collect()),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            order.sort(&mut keys);
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), sort_json_deep(&map[key.as_str()], order));
            }
            Value::Object(out)
        }
        _ => value.clone(),
    }
}

/// A top-level object is flat when any of its keys contains a literal `.`.
pub fn detect_shape(value: &Value) -> JsonShape {
    match value {
        Value::Object(map) if map.keys().any(|k| k.contains('.')) => JsonShape::Flat,
        _ => JsonShape::Tree,
    }
}

/// Expand a flat map of dotted keys into a nested tree.
///
/// Later entries win: a key nesting under an earlier entry's leaf or array
/// replaces it with an object. Entries whose index lies too far past the end
/// of an earlier array are skipped.
pub fn build_tree_from_flat(map: &Map<String, Value>) -> Value {
    let mut root = Value::Object(Map::new());
    for (key, value) in map {
        let _ = set(&mut root, key, value.clone());
    }
    root
}

fn looks_like_json(text: &str) -> bool {
    (text.starts_with('{') && text.ends_with('}')) || (text.starts_with('[') && text.ends_with(']'))
}

/// Normalize a freshly loaded document.
///
/// A string payload that looks like a JSON object or array is parsed, at most
/// twice, to unwrap double-encoded documents. A flat top-level object is then
/// expanded into a tree. Already nested trees pass through unchanged, so the
/// normalization is idempotent.
///
/// # Example
///
/// ```
/// use json_merge_path::normalize_loaded_json;
/// use serde_json::json;
///
/// let encoded = json!(r#""{\"a.b\": 1}""#);
/// assert_eq!(normalize_loaded_json(encoded), json!({"a": {"b": 1}}));
///
/// let tree = json!({"a": {"b": 1}});
/// assert_eq!(normalize_loaded_json(tree.clone()), tree);
/// ```
pub fn normalize_loaded_json(value: Value) -> Value {
    let mut current = value;
    for _ in 0..2 {
        let parsed = match &current {
            Value::String(text) => {
                let trimmed = text.trim();
                if !looks_like_json(trimmed) {
                    break;
                }
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(v) => v,
                    Err(_) => break,
                }
            }
            _ => break,
        };
        current = parsed;
    }

    match &current {
        Value::Object(map) if detect_shape(&current) == JsonShape::Flat => build_tree_from_flat(map),
        _ => current,
    }
}
