//! Default Result construction and effective-origin resolution.

use std::collections::BTreeMap;

use json_merge_path::{clone_deep, get, loosely_equal, set, union_leaf_paths};
use serde_json::Value;

use crate::types::{Pane, Pick, Side};

/// Per-leaf override map. A missing entry means `Pick::Auto`.
pub type PickMap = BTreeMap<String, Pick>;

/// Build the auto-merge tree.
///
/// The truth side is cloned as the base; every leaf path of A or B that the
/// base lacks is then copied in from the other side. Every leaf present in
/// either source therefore appears in the result, and truth-side values win
/// all conflicts.
pub fn build_auto_result_tree(a: &Value, b: &Value, truth: Side) -> Value {
    let (base, other) = match truth {
        Side::A => (a, b),
        Side::B => (b, a),
    };
    let mut out = clone_deep(base);
    for path in union_leaf_paths(&[a, b]) {
        if get(&out, &path).is_some() {
            continue;
        }
        if let Some(value) = get(other, &path) {
            // An index far past the end of a base array stays as the base has it.
            if let Err(err) = set(&mut out, &path, value.clone()) {
                tracing::trace!(path = %path, error = %err, "leaf not merged into base");
            }
        }
    }
    out
}

/// Resolve which pane owns `path` for attribution.
///
/// Explicit `A`/`B` picks win; `Edited`/`Added` belong to the Result. Without
/// a pick, a path that exists on only one side belongs to that side
/// regardless of truth, otherwise to the truth side.
pub fn effective_pick(a: &Value, b: &Value, truth: Side, picks: &PickMap, path: &str) -> Pane {
    match picks.get(path).copied().unwrap_or_default() {
        Pick::A => return Pane::A,
        Pick::B => return Pane::B,
        Pick::Edited | Pick::Added => return Pane::R,
        Pick::Auto => {}
    }
    match (get(a, path).is_some(), get(b, path).is_some()) {
        (true, false) => Pane::A,
        (false, true) => Pane::B,
        _ => truth.into(),
    }
}

/// A path is a conflict when both sides hold it with different coerced values.
pub fn is_conflict(a: &Value, b: &Value, path: &str) -> bool {
    match (get(a, path), get(b, path)) {
        (Some(va), Some(vb)) => !loosely_equal(Some(va), Some(vb)),
        _ => false,
    }
}
