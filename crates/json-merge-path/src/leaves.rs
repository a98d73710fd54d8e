//! Leaf path enumeration.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::child_path;

/// Reserved object key excluded from path enumeration wherever it appears.
pub const META_KEY: &str = "_meta";

/// Collect every path that resolves to a primitive, depth first.
///
/// Arrays terminate at their index paths, never at the array itself. Empty
/// objects and arrays contribute no paths, and neither does a primitive root.
///
/// # Example
///
/// ```
/// use json_merge_path::collect_leaf_paths;
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": 1, "_meta": {"x": 1}}, "c": [true, {"d": null}]});
/// assert_eq!(collect_leaf_paths(&doc), vec!["a.b", "c.0", "c.1.d"]);
/// ```
pub fn collect_leaf_paths(root: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_leaf_paths_into(root, "", &mut out);
    out
}

/// Append the leaf paths of `root` (rooted at `prefix`) to `out`.
pub fn collect_leaf_paths_into(root: &Value, prefix: &str, out: &mut Vec<String>) {
    match root {
        Value::Object(map) => {
            for (key, value) in map {
                if key == META_KEY {
                    continue;
                }
                collect_leaf_paths_into(value, &child_path(prefix, key), out);
            }
        }
        Value::Array(items) => {
            for (i, value) in items.iter().enumerate() {
                collect_leaf_paths_into(value, &child_path(prefix, &i.to_string()), out);
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.push(prefix.to_owned());
            }
        }
    }
}

/// Union of the leaf paths of several roots.
pub fn union_leaf_paths(roots: &[&Value]) -> BTreeSet<String> {
    let mut out = Vec::new();
    for root in roots {
        collect_leaf_paths_into(root, "", &mut out);
    }
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_root_has_no_paths() {
        assert!(collect_leaf_paths(&json!(1)).is_empty());
        assert!(collect_leaf_paths(&json!(null)).is_empty());
    }

    #[test]
    fn test_empty_containers_have_no_paths() {
        assert!(collect_leaf_paths(&json!({"a": {}, "b": []})).is_empty());
    }

    #[test]
    fn test_array_root() {
        assert_eq!(collect_leaf_paths(&json!([1, [2]])), vec!["0", "1.0"]);
    }

    #[test]
    fn test_meta_skipped_at_any_depth() {
        let doc = json!({"_meta": 1, "a": [{"_meta": {"v": 2}, "k": 3}]});
        assert_eq!(collect_leaf_paths(&doc), vec!["a.0.k"]);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let doc = json!({"z": 1, "a": 2});
        assert_eq!(collect_leaf_paths(&doc), vec!["z", "a"]);
    }

    #[test]
    fn test_union_deduplicates() {
        let a = json!({"x": 1, "y": 2});
        let b = json!({"y": 3, "z": 4});
        let all: Vec<String> = union_leaf_paths(&[&a, &b]).into_iter().collect();
        assert_eq!(all, vec!["x", "y", "z"]);
    }
}
