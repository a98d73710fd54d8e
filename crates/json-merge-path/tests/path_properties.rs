//! Property-based invariants for the path model.
//!
//! Verifies:
//! 1. `set` then `get` at the same path returns the written value
//! 2. `set` never disturbs leaves outside the written path
//! 3. `normalize_loaded_json` is idempotent on nested trees
//! 4. `sort_json_deep` keeps the set of (path, value) leaf pairs

use std::collections::BTreeMap;

use json_merge_path::{
    collect_leaf_paths, get, is_within, normalize_loaded_json, set, sort_json_deep, SortOrder,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_key() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| Value::from(n)),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::String),
    ]
}

fn arb_tree() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn arb_object_tree() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(arb_key(), arb_tree(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

fn leaf_pairs(root: &Value) -> BTreeMap<String, Value> {
    collect_leaf_paths(root)
        .into_iter()
        .map(|p| {
            let v = get(root, &p).cloned().unwrap_or(Value::Null);
            (p, v)
        })
        .collect()
}

proptest! {
    #[test]
    fn set_then_get(mut root in arb_object_tree(), keys in prop::collection::vec(arb_key(), 1..4), value in arb_leaf()) {
        let path = keys.join(".");
        if set(&mut root, &path, value.clone()).is_ok() {
            prop_assert_eq!(get(&root, &path), Some(&value));
        }
    }

    #[test]
    fn set_keeps_unrelated_leaves(root in arb_object_tree(), keys in prop::collection::vec(arb_key(), 1..4), value in arb_leaf()) {
        let path = keys.join(".");
        let before = leaf_pairs(&root);
        let mut after_root = root.clone();
        if set(&mut after_root, &path, value).is_ok() {
            let after = leaf_pairs(&after_root);
            for (p, v) in &before {
                if is_within(&path, p) || is_within(p, &path) {
                    continue;
                }
                // Keys are never numeric, so any non-object ancestor becomes an object.
                let ancestor_replaced = keys.iter().enumerate().any(|(i, _)| {
                    let prefix = keys[..=i].join(".");
                    is_within(&prefix, p) && !matches!(get(&root, &prefix), Some(Value::Object(_)))
                });
                if ancestor_replaced {
                    continue;
                }
                prop_assert_eq!(after.get(p), Some(v));
            }
        }
    }

    #[test]
    fn normalize_is_idempotent(root in arb_object_tree()) {
        let once = normalize_loaded_json(root);
        let twice = normalize_loaded_json(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sort_keeps_leaf_pairs(root in arb_tree(), desc in any::<bool>()) {
        let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
        let sorted = sort_json_deep(&root, order);
        prop_assert_eq!(leaf_pairs(&root), leaf_pairs(&sorted));
    }
}
