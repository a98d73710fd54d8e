//! Property-based invariants for diffing, merging and the text views.
//!
//! Verifies:
//! 1. JSON text round-trips in pretty and minified modes
//! 2. Flat text round-trips the set of (path, value) leaf pairs
//! 3. The auto-merge holds every leaf path of either source
//! 4. The truth side wins every conflicting leaf
//! 5. The Diff Set does not depend on argument order
//! 6. Reset restores the auto-merge value and forgets the pick

use std::collections::BTreeMap;

use json_merge::auto_merge::build_auto_result_tree;
use json_merge::diff::make_diff_set;
use json_merge::flat::{parse_flat_text_to_tree, to_flat_text};
use json_merge::json_text::{parse_json, stringify};
use json_merge::session::{MergeSession, SessionOptions};
use json_merge::types::{Pick, Side};
use json_merge_path::{
    collect_leaf_paths, delete, get, loosely_equal, set, union_leaf_paths, SortOrder,
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
        any::<i32>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::String),
    ]
}

fn object_of(inner: impl Strategy<Value = Value>) -> impl Strategy<Value = Value> {
    prop::collection::btree_map(arb_key(), inner, 0..4)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

fn arb_tree() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            object_of(inner),
        ]
    })
}

/// Nested objects with primitive leaves only.
fn arb_schema() -> impl Strategy<Value = Value> {
    object_of(arb_leaf().prop_recursive(3, 24, 4, |inner| object_of(inner)))
}

/// Per-leaf mask: (present in A, present in B, B holds a different value).
type Mask = Vec<(bool, bool, bool)>;

/// Derive two sources from one schema so that no path is a leaf on one
/// side and a subtree on the other.
fn project(schema: &Value, mask: &Mask) -> (Value, Value) {
    let mut a = schema.clone();
    let mut b = schema.clone();
    for (i, path) in collect_leaf_paths(schema).iter().enumerate() {
        let (in_a, in_b, differs) = mask.get(i).copied().unwrap_or((true, true, false));
        if !in_a {
            delete(&mut a, path);
        }
        if !in_b {
            delete(&mut b, path);
        } else if differs {
            set(&mut b, path, Value::String(format!("b-{i}"))).unwrap();
        }
    }
    (a, b)
}

fn arb_sources() -> impl Strategy<Value = (Value, Value)> {
    (arb_schema(), prop::collection::vec(any::<(bool, bool, bool)>(), 0..32))
        .prop_map(|(schema, mask)| project(&schema, &mask))
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

fn truth_of(b: bool) -> Side {
    if b {
        Side::B
    } else {
        Side::A
    }
}

proptest! {
    #[test]
    fn json_text_round_trip(v in arb_tree(), minify in any::<bool>()) {
        prop_assert_eq!(parse_json(&stringify(&v, minify)).unwrap(), v);
    }

    #[test]
    fn flat_text_round_trip(v in arb_tree(), desc in any::<bool>()) {
        let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
        let parsed = parse_flat_text_to_tree(&to_flat_text(&v, order)).unwrap();
        prop_assert_eq!(leaf_pairs(&parsed), leaf_pairs(&v));
    }

    #[test]
    fn auto_merge_is_total((a, b) in arb_sources(), truth_b in any::<bool>()) {
        let merged = build_auto_result_tree(&a, &b, truth_of(truth_b));
        for path in union_leaf_paths(&[&a, &b]) {
            prop_assert!(get(&merged, &path).is_some(), "missing {}", path);
        }
    }

    #[test]
    fn truth_wins_conflicts((a, b) in arb_sources(), truth_b in any::<bool>()) {
        let truth = truth_of(truth_b);
        let merged = build_auto_result_tree(&a, &b, truth);
        let winner = if truth == Side::A { &a } else { &b };
        for path in union_leaf_paths(&[&a, &b]) {
            let (va, vb) = (get(&a, &path), get(&b, &path));
            if va.is_some() && vb.is_some() && !loosely_equal(va, vb) {
                prop_assert_eq!(get(&merged, &path), get(winner, &path));
            }
        }
    }

    #[test]
    fn diff_is_symmetric(a in arb_tree(), b in arb_tree()) {
        prop_assert_eq!(make_diff_set(&a, &b), make_diff_set(&b, &a));
    }

    #[test]
    fn reset_restores_auto_value((a, b) in arb_sources(), picks in prop::collection::vec(any::<prop::sample::Index>(), 1..4)) {
        let mut session = MergeSession::with_sources(a, b.clone(), SessionOptions::default());
        let paths: Vec<String> = collect_leaf_paths(&b);
        prop_assume!(!paths.is_empty());
        let chosen: Vec<&String> = picks.iter().map(|ix| ix.get(&paths)).collect();

        for path in &chosen {
            session.use_side(Side::B, path).unwrap();
        }
        for path in &chosen {
            session.reset(path).unwrap();
            prop_assert_eq!(get(session.result(), path), get(session.auto_result(), path));
            prop_assert!(session.picks().get(*path).is_none());
            prop_assert_eq!(session.pick(path), Pick::Auto);
        }
    }
}
