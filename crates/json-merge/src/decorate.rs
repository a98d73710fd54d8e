//! Per-pane, per-path decoration classification.
//!
//! Each leaf path gets at most one highlight on each pane, checked in this
//! order:
//!
//! 1. `added` - operator-introduced key (Result pane only)
//! 2. `edited` - Result value diverges from the auto-merge baseline (Result pane only)
//! 3. `conflict` - a diverging path resolved by an explicit pick (any pane)
//! 4. `new` - a value that exists in one source only and is carried into the
//!    pane by the effective pick (never shown on its native pane)
//!
//! A `find` mark is independent of the highlight and comes from the Result
//! pane's search matches whichever pane asks.

use std::collections::BTreeSet;

use json_merge_path::contains;
use serde::Serialize;
use serde_json::Value;

use crate::auto_merge::{effective_pick, PickMap};
use crate::diff::{leaf_status, DiffSet};
use crate::types::{Pane, Pick, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    New,
    Conflict,
    Added,
    Edited,
}

/// Full classification of one path on one pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decoration {
    pub highlight: Option<Highlight>,
    pub find: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoKind {
    New,
    Conflict,
    Added,
    Edited,
    Find,
}

impl From<Highlight> for DecoKind {
    fn from(h: Highlight) -> Self {
        match h {
            Highlight::New => DecoKind::New,
            Highlight::Conflict => DecoKind::Conflict,
            Highlight::Added => DecoKind::Added,
            Highlight::Edited => DecoKind::Edited,
        }
    }
}

/// A decoration entry as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deco {
    pub path: String,
    pub kind: DecoKind,
}

/// Everything the classifier reads. All sets are borrowed from the session.
#[derive(Debug, Clone, Copy)]
pub struct DecorationState<'a> {
    pub a: &'a Value,
    pub b: &'a Value,
    pub result: &'a Value,
    pub truth: Side,
    pub picks: &'a PickMap,
    pub added: &'a BTreeSet<String>,
    pub edited: &'a BTreeSet<String>,
    pub diff: &'a DiffSet,
    /// Result-pane search matches.
    pub found: &'a BTreeSet<String>,
}

impl<'a> DecorationState<'a> {
    fn pick(&self, path: &str) -> Pick {
        self.picks.get(path).copied().unwrap_or_default()
    }

    fn pane_root(&self, pane: Pane) -> &'a Value {
        match pane {
            Pane::A => self.a,
            Pane::B => self.b,
            Pane::R => self.result,
        }
    }

    fn highlight(&self, pane: Pane, path: &str) -> Option<Highlight> {
        let pick = self.pick(path);

        if self.added.contains(path) || pick == Pick::Added {
            return (pane == Pane::R).then_some(Highlight::Added);
        }
        if self.edited.contains(path) || pick == Pick::Edited {
            return (pane == Pane::R).then_some(Highlight::Edited);
        }
        if self.diff.contains(path) && matches!(pick, Pick::A | Pick::B | Pick::Edited) {
            return Some(Highlight::Conflict);
        }

        let native = leaf_status(self.a, self.b, path).single_source()?;
        let owner = effective_pick(self.a, self.b, self.truth, self.picks, path);
        let native_pane = Pane::from(native);
        let carried = owner == native_pane
            && pane != native_pane
            && contains(self.pane_root(pane), path);
        carried.then_some(Highlight::New)
    }
}

/// Classify `path` on `pane`.
pub fn decoration_for(pane: Pane, path: &str, state: &DecorationState<'_>) -> Decoration {
    Decoration {
        highlight: state.highlight(pane, path),
        find: state.found.contains(path),
    }
}

/// Decorations for every key in `keys` on `pane`, a `find` entry first
/// when both apply to the same path.
pub fn decorations_for_pane<'k, I>(pane: Pane, keys: I, state: &DecorationState<'_>) -> Vec<Deco>
where
    I: IntoIterator<Item = &'k String>,
{
    let mut out = Vec::new();
    for key in keys {
        let deco = decoration_for(pane, key, state);
        if deco.find {
            out.push(Deco {
                path: key.clone(),
                kind: DecoKind::Find,
            });
        }
        if let Some(h) = deco.highlight {
            out.push(Deco {
                path: key.clone(),
                kind: h.into(),
            });
        }
    }
    out
}
