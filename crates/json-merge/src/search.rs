//! Case-insensitive search over leaf paths and pane values.

use json_merge_path::{coerce_to_string, get};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Pane;

/// Search behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Match against the pane's value at a path, not only the path itself.
    pub in_values: bool,
    /// Let panes A and B report matches; when off only the Result pane does.
    pub sync_panes: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            in_values: true,
            sync_panes: true,
        }
    }
}

/// The three roots a search can look into.
#[derive(Debug, Clone, Copy)]
pub struct PaneRoots<'a> {
    pub a: &'a Value,
    pub b: &'a Value,
    pub r: &'a Value,
}

impl<'a> PaneRoots<'a> {
    pub fn root(&self, pane: Pane) -> &'a Value {
        match pane {
            Pane::A => self.a,
            Pane::B => self.b,
            Pane::R => self.r,
        }
    }
}

/// Check if `path` matches `query` in `pane`.
///
/// A blank query matches nothing.
///
/// # Example
///
/// ```
/// use json_merge::search::{matches_in_pane, PaneRoots, SearchOptions};
/// use json_merge::types::Pane;
/// use serde_json::json;
///
/// let a = json!({"title": "Hello"});
/// let b = json!({});
/// let r = json!({"title": "Bye"});
/// let roots = PaneRoots { a: &a, b: &b, r: &r };
/// let opts = SearchOptions::default();
///
/// assert!(matches_in_pane(&roots, Pane::A, "title", "HELLO", opts));
/// assert!(!matches_in_pane(&roots, Pane::R, "title", "hello", opts));
/// assert!(matches_in_pane(&roots, Pane::R, "title", "TIT", opts));
/// assert!(!matches_in_pane(&roots, Pane::R, "title", "  ", opts));
/// ```
pub fn matches_in_pane(
    roots: &PaneRoots<'_>,
    pane: Pane,
    path: &str,
    query: &str,
    opts: SearchOptions,
) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    if !opts.sync_panes && pane != Pane::R {
        return false;
    }
    if path.to_lowercase().contains(&needle) {
        return true;
    }
    if !opts.in_values {
        return false;
    }
    coerce_to_string(get(roots.root(pane), path))
        .to_lowercase()
        .contains(&needle)
}

/// Filter `keys` down to the ones matching `query` in `pane`, keeping order.
pub fn matching_paths<'k, I>(
    roots: &PaneRoots<'_>,
    pane: Pane,
    keys: I,
    query: &str,
    opts: SearchOptions,
) -> Vec<String>
where
    I: IntoIterator<Item = &'k String>,
{
    if query.trim().is_empty() {
        return Vec::new();
    }
    keys.into_iter()
        .filter(|k| matches_in_pane(roots, pane, k, query, opts))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_value_match_is_coerced() {
        let a = json!({"n": 12345, "flag": true, "z": null});
        let empty = json!({});
        let roots = PaneRoots { a: &a, b: &empty, r: &empty };
        let opts = SearchOptions::default();
        assert!(matches_in_pane(&roots, Pane::A, "n", "234", opts));
        assert!(matches_in_pane(&roots, Pane::A, "flag", "TRUE", opts));
        assert!(!matches_in_pane(&roots, Pane::A, "z", "null", opts));
    }

    #[test]
    fn test_values_disabled() {
        let r = json!({"k": "needle"});
        let roots = PaneRoots { a: &r, b: &r, r: &r };
        let opts = SearchOptions {
            in_values: false,
            ..SearchOptions::default()
        };
        assert!(!matches_in_pane(&roots, Pane::R, "k", "needle", opts));
        assert!(matches_in_pane(&roots, Pane::R, "k", "k", opts));
    }

    #[test]
    fn test_unsynced_panes_only_match_result() {
        let r = json!({"k": 1});
        let roots = PaneRoots { a: &r, b: &r, r: &r };
        let opts = SearchOptions {
            sync_panes: false,
            ..SearchOptions::default()
        };
        assert!(!matches_in_pane(&roots, Pane::A, "k", "k", opts));
        assert!(!matches_in_pane(&roots, Pane::B, "k", "k", opts));
        assert!(matches_in_pane(&roots, Pane::R, "k", "k", opts));
    }

    #[test]
    fn test_matching_paths_keeps_order() {
        let r = json!({"b": {"name": "x"}, "a": {"name": "y"}, "c": 1});
        let roots = PaneRoots { a: &r, b: &r, r: &r };
        let all = keys(&["a.name", "b.name", "c"]);
        let found = matching_paths(&roots, Pane::R, &all, "name", SearchOptions::default());
        assert_eq!(found, keys(&["a.name", "b.name"]));
        assert!(matching_paths(&roots, Pane::R, &all, "", SearchOptions::default()).is_empty());
    }
}
