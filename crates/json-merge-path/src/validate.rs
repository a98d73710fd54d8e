//! Validation of operator-supplied keys before they are added to a tree.

use serde_json::Value;
use thiserror::Error;

use crate::{get, join_path, split_path};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyConflict {
    #[error("key is empty")]
    Empty,
    #[error("key already exists")]
    Exists,
    #[error("`{0}` already holds a value")]
    PrefixIsValue(String),
}

/// Check that `path` can be introduced into `root` as a new leaf without
/// overwriting anything.
///
/// # Errors
///
/// - `KeyConflict::Empty` - the trimmed path is empty
/// - `KeyConflict::Exists` - the path already resolves
/// - `KeyConflict::PrefixIsValue` - a proper prefix holds a primitive, `null` or array
///
/// # Example
///
/// ```
/// use json_merge_path::{validate_new_key, KeyConflict};
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": 1}, "n": 5});
/// assert!(validate_new_key(&doc, "a.c").is_ok());
/// assert_eq!(validate_new_key(&doc, "a.b"), Err(KeyConflict::Exists));
/// assert_eq!(validate_new_key(&doc, "n.x"), Err(KeyConflict::PrefixIsValue("n".into())));
/// ```
pub fn validate_new_key(root: &Value, path: &str) -> Result<(), KeyConflict> {
    let path = path.trim();
    if path.is_empty() {
        return Err(KeyConflict::Empty);
    }
    if get(root, path).is_some() {
        return Err(KeyConflict::Exists);
    }

    let segments = split_path(path);
    for end in 1..segments.len() {
        let prefix = join_path(&segments[..end]);
        match get(root, &prefix) {
            Some(Value::Object(_)) | None => {}
            Some(_) => return Err(KeyConflict::PrefixIsValue(prefix)),
        }
    }
    Ok(())
}
