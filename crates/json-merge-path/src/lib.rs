//! Dotted-path addressing for JSON trees.
//!
//! A path joins object keys and array indices with `.` (`a.b.0.c`). Paths are
//! the only identity a leaf has: two leaves in different documents are the
//! same entity iff their paths are equal. Arrays are addressed positionally,
//! so inserting or removing an element shifts the identity of every later
//! element.
//!
//! # Example
//!
//! ```
//! use json_merge_path::{get, set, delete, collect_leaf_paths};
//! use serde_json::json;
//!
//! let mut doc = json!({"a": {"b": [1, 2]}});
//! assert_eq!(get(&doc, "a.b.1"), Some(&json!(2)));
//!
//! set(&mut doc, "a.c.d", json!("x")).unwrap();
//! assert_eq!(doc, json!({"a": {"b": [1, 2], "c": {"d": "x"}}}));
//!
//! assert_eq!(delete(&mut doc, "a.c"), Some(json!({"d": "x"})));
//! assert_eq!(collect_leaf_paths(&doc), vec!["a.b.0", "a.b.1"]);
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

pub mod coerce;
pub use coerce::{coerce_to_string, loosely_equal};

pub mod leaves;
pub use leaves::{collect_leaf_paths, collect_leaf_paths_into, union_leaf_paths, META_KEY};

pub mod shape;
pub use shape::{
    build_tree_from_flat, clone_deep, detect_shape, normalize_loaded_json, sort_json_deep,
    JsonShape, SortOrder,
};

pub mod validate;
pub use validate::{validate_new_key, KeyConflict};

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// How far past the end of an array `set` is willing to pad with `null`.
const MAX_ARRAY_GROWTH: usize = 1 << 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid array index `{0}`")]
    InvalidIndex(String),
    #[error("array index {index} is too far past the end of an array of {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Split a path into its non-empty segments.
///
/// Empty segments (`a..b`, leading or trailing dots) are dropped.
///
/// # Example
///
/// ```
/// use json_merge_path::split_path;
///
/// assert_eq!(split_path("a.b.0"), vec!["a", "b", "0"]);
/// assert_eq!(split_path(".a..b."), vec!["a", "b"]);
/// assert!(split_path("").is_empty());
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Join segments back into a dotted path.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(segment.as_ref());
    }
    out
}

/// Path of `key` under `prefix`; the root prefix is the empty string.
pub fn child_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        let mut out = String::with_capacity(prefix.len() + key.len() + 1);
        out.push_str(prefix);
        out.push(SEPARATOR);
        out.push_str(key);
        out
    }
}

/// Check if `path` is `prefix` itself or lies somewhere below it.
///
/// # Example
///
/// ```
/// use json_merge_path::is_within;
///
/// assert!(is_within("a", "a"));
/// assert!(is_within("a", "a.b.c"));
/// assert!(!is_within("a", "ab"));
/// ```
pub fn is_within(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Check if `child` lies strictly below `parent`.
pub fn is_child(parent: &str, child: &str) -> bool {
    parent != child && is_within(parent, child)
}

/// Parent of a path, or `None` for a single-segment or empty path.
pub fn parent(path: &str) -> Option<String> {
    let segments = split_path(path);
    match segments.split_last() {
        Some((_, rest)) if !rest.is_empty() => Some(join_path(rest)),
        _ => None,
    }
}

/// Check if a segment is a canonical non-negative array index (`0`, `17`,
/// but not `01`, `-1` or `+1`).
pub fn is_valid_index(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return false;
    }
    bytes.iter().all(u8::is_ascii_digit)
}

fn parse_index(segment: &str) -> Result<usize, PathError> {
    if !is_valid_index(segment) {
        return Err(PathError::InvalidIndex(segment.to_owned()));
    }
    segment
        .parse()
        .map_err(|_| PathError::InvalidIndex(segment.to_owned()))
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) if is_valid_index(segment) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

fn step_mut<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match current {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) if is_valid_index(segment) => {
            items.get_mut(segment.parse::<usize>().ok()?)
        }
        _ => None,
    }
}

/// Get the value at `path`.
///
/// The empty path resolves to the root. Returns `None` when any segment is
/// missing or an intermediate value cannot be indexed.
///
/// # Example
///
/// ```
/// use json_merge_path::get;
/// use serde_json::json;
///
/// let doc = json!({"a": [{"b": true}]});
/// assert_eq!(get(&doc, "a.0.b"), Some(&json!(true)));
/// assert_eq!(get(&doc, "a.1.b"), None);
/// assert_eq!(get(&doc, "a.0.b.c"), None);
/// ```
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    split_path(path)
        .into_iter()
        .try_fold(root, |current, segment| step(current, segment))
}

/// Get a mutable reference to the value at `path`.
pub fn get_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in split_path(path) {
        current = step_mut(current, segment)?;
    }
    Some(current)
}

/// Check if `path` resolves to a value (an explicit `null` counts).
pub fn contains(root: &Value, path: &str) -> bool {
    get(root, path).is_some()
}

/// Write `value` at `path`, creating plain objects for missing intermediate
/// segments.
///
/// Existing arrays along the way are indexed numerically and padded with
/// `null` when the index lies past the end; arrays are never created
/// implicitly. A primitive, or an array addressed by a non-numeric segment,
/// is replaced by an object. The empty path is a no-op.
///
/// # Errors
///
/// - `PathError::IndexOutOfRange` - an index lies unreasonably far past the end
///
/// # Example
///
/// ```
/// use json_merge_path::set;
/// use serde_json::json;
///
/// let mut doc = json!({"a": 1});
/// set(&mut doc, "a.b", json!(2)).unwrap();
/// assert_eq!(doc, json!({"a": {"b": 2}}));
///
/// let mut list = json!({"xs": [1]});
/// set(&mut list, "xs.2", json!(3)).unwrap();
/// assert_eq!(list, json!({"xs": [1, null, 3]}));
/// set(&mut list, "xs.first", json!(0)).unwrap();
/// assert_eq!(list, json!({"xs": {"first": 0}}));
/// ```
pub fn set(root: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let segments = split_path(path);
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };
    let mut current = root;
    for segment in parents {
        current = descend_or_create(current, segment)?;
    }
    assign(current, last, value)
}

fn array_slot<'a>(items: &'a mut Vec<Value>, segment: &str) -> Result<&'a mut Value, PathError> {
    let index = parse_index(segment)?;
    if index >= items.len() {
        if index - items.len() > MAX_ARRAY_GROWTH {
            return Err(PathError::IndexOutOfRange {
                index,
                len: items.len(),
            });
        }
        items.resize(index + 1, Value::Null);
    }
    Ok(&mut items[index])
}

fn descend_or_create<'a>(node: &'a mut Value, segment: &str) -> Result<&'a mut Value, PathError> {
    let descendable = match node {
        Value::Array(_) => is_valid_index(segment),
        Value::Object(_) => true,
        _ => false,
    };
    if !descendable {
        *node = Value::Object(Map::new());
    }
    let slot = match node {
        Value::Array(items) => array_slot(items, segment)?,
        Value::Object(map) => map.entry(segment.to_owned()).or_insert(Value::Null),
        _ => unreachable!("node was replaced with an object above"),
    };
    if !is_container(slot) {
        *slot = Value::Object(Map::new());
    }
    Ok(slot)
}

fn assign(node: &mut Value, key: &str, value: Value) -> Result<(), PathError> {
    match node {
        Value::Object(map) => {
            map.insert(key.to_owned(), value);
        }
        Value::Array(items) if is_valid_index(key) => {
            *array_slot(items, key)? = value;
        }
        other => {
            let mut map = Map::new();
            map.insert(key.to_owned(), value);
            *other = Value::Object(map);
        }
    }
    Ok(())
}

/// Remove the final segment of `path` from its parent and return the removed
/// value.
///
/// Object siblings keep their relative order. Removing from an array shifts
/// every later element down by one index.
///
/// # Example
///
/// ```
/// use json_merge_path::delete;
/// use serde_json::json;
///
/// let mut doc = json!({"a": {"x": 1, "y": 2}, "list": [1, 2, 3]});
/// assert_eq!(delete(&mut doc, "a.x"), Some(json!(1)));
/// assert_eq!(delete(&mut doc, "list.0"), Some(json!(1)));
/// assert_eq!(doc, json!({"a": {"y": 2}, "list": [2, 3]}));
/// assert_eq!(delete(&mut doc, "missing.key"), None);
/// ```
pub fn delete(root: &mut Value, path: &str) -> Option<Value> {
    let segments = split_path(path);
    let (last, parents) = segments.split_last()?;
    let mut parent = root;
    for segment in parents {
        parent = step_mut(parent, segment)?;
    }
    match parent {
        Value::Object(map) => map.shift_remove(*last),
        Value::Array(items) => {
            let index = parse_index(last).ok()?;
            (index < items.len()).then(|| items.remove(index))
        }
        _ => None,
    }
}
