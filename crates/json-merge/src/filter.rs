//! Visibility filters: only-diff trees and per-pane hidden keys.

use json_merge_path::{child_path, collect_leaf_paths_into, META_KEY};
use serde_json::{Map, Value};

use crate::diff::DiffSet;

/// Leaf paths hidden on a pane.
///
/// A key is hidden when only-diff filtering is on and the key is not in the
/// Diff Set, or when a non-blank query does not match it.
pub fn hidden_keys_for_pane<F>(
    keys: &[String],
    only_diff: bool,
    diff: &DiffSet,
    query: &str,
    is_match: F,
) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let searching = !query.trim().is_empty();
    keys.iter()
        .filter(|k| (only_diff && !diff.contains(*k)) || (searching && !is_match(k)))
        .cloned()
        .collect()
}

/// Prune `root` down to the branches that lead to a Diff Set leaf.
///
/// Arrays are kept whole when any leaf under them differs; `_meta` is
/// dropped; empty branches disappear. Returns `{}` when nothing differs.
///
/// # Example
///
/// ```
/// use json_merge::diff::make_diff_set;
/// use json_merge::filter::diff_only_tree;
/// use serde_json::json;
///
/// let a = json!({"same": 1, "g": {"x": 1, "y": 2}});
/// let b = json!({"same": 1, "g": {"x": 1, "y": 3}});
/// let diff = make_diff_set(&a, &b);
/// assert_eq!(diff_only_tree(&a, &diff), json!({"g": {"y": 2}}));
/// ```
pub fn diff_only_tree(root: &Value, diff: &DiffSet) -> Value {
    prune(root, "", diff).unwrap_or_else(|| Value::Object(Map::new()))
}

fn prune(node: &Value, prefix: &str, diff: &DiffSet) -> Option<Value> {
    match node {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                if key == META_KEY {
                    continue;
                }
                if let Some(child) = prune(value, &child_path(prefix, key), diff) {
                    out.insert(key.clone(), child);
                }
            }
            (!out.is_empty()).then_some(Value::Object(out))
        }
        Value::Array(_) => {
            let mut leaves = Vec::new();
            collect_leaf_paths_into(node, prefix, &mut leaves);
            let keep = diff.contains(prefix) || leaves.iter().any(|p| diff.contains(p));
            (keep && !prefix.is_empty()).then(|| node.clone())
        }
        _ => (!prefix.is_empty() && diff.contains(prefix)).then(|| node.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::make_diff_set;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_nothing_differs() {
        let a = json!({"a": {"b": 1}});
        assert_eq!(diff_only_tree(&a, &make_diff_set(&a, &a)), json!({}));
    }

    #[test]
    fn test_array_kept_whole() {
        let a = json!({"xs": [1, 2, 3], "k": 1});
        let b = json!({"xs": [1, 2, 4], "k": 1});
        let diff = make_diff_set(&a, &b);
        assert_eq!(diff_only_tree(&b, &diff), json!({"xs": [1, 2, 4]}));
    }

    #[test]
    fn test_meta_dropped() {
        let a = json!({"_meta": {"v": 1}, "k": 1});
        let b = json!({"_meta": {"v": 2}, "k": 2});
        let diff = make_diff_set(&a, &b);
        assert_eq!(diff_only_tree(&a, &diff), json!({"k": 1}));
    }

    #[test]
    fn test_hidden_by_only_diff() {
        let keys = strings(&["a", "b"]);
        let diff: DiffSet = ["b".to_string()].into_iter().collect();
        let hidden = hidden_keys_for_pane(&keys, true, &diff, "", |_| true);
        assert_eq!(hidden, strings(&["a"]));
    }

    #[test]
    fn test_hidden_by_query() {
        let keys = strings(&["alpha", "beta"]);
        let diff = DiffSet::new();
        let hidden = hidden_keys_for_pane(&keys, false, &diff, "al", |k| k.contains("al"));
        assert_eq!(hidden, strings(&["beta"]));
        let hidden = hidden_keys_for_pane(&keys, false, &diff, "  ", |_| false);
        assert!(hidden.is_empty());
    }
}
