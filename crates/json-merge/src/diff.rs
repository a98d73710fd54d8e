//! Leaf-level diff between the two source documents.
//!
//! Every leaf path of A or B is classified as `same`, `diff`, `onlyA` or
//! `onlyB`. Values present on both sides are compared by their coerced string
//! forms (`null` and missing coerce to the empty string), so `1` and `"1"` at
//! the same path are the same. Arrays are compared element by element through
//! their index paths; there is no content-aware alignment.

use std::collections::{BTreeMap, BTreeSet};

use json_merge_path::{get, loosely_equal, union_leaf_paths};
use serde_json::Value;

use crate::types::LeafStatus;

/// Paths present in A or B whose status is not `same`.
pub type DiffSet = BTreeSet<String>;

/// Classify a single path.
pub fn leaf_status(a: &Value, b: &Value, path: &str) -> LeafStatus {
    let va = get(a, path);
    let vb = get(b, path);
    match (va, vb) {
        (Some(_), None) => LeafStatus::OnlyA,
        (None, Some(_)) => LeafStatus::OnlyB,
        _ if loosely_equal(va, vb) => LeafStatus::Same,
        _ => LeafStatus::Diff,
    }
}

/// Classify every leaf path in the union of A's and B's leaves.
pub fn leaf_statuses(a: &Value, b: &Value) -> BTreeMap<String, LeafStatus> {
    union_leaf_paths(&[a, b])
        .into_iter()
        .map(|path| {
            let status = leaf_status(a, b, &path);
            (path, status)
        })
        .collect()
}

/// Build the Diff Set: every leaf path whose status is not `same`.
pub fn make_diff_set(a: &Value, b: &Value) -> DiffSet {
    leaf_statuses(a, b)
        .into_iter()
        .filter(|(_, status)| *status != LeafStatus::Same)
        .map(|(path, _)| path)
        .collect()
}
