//! The reconciliation session.
//!
//! A [`MergeSession`] owns both source trees, the Result tree with its text
//! buffer, the per-leaf pick map and the added-key set. Every mutation goes
//! through one of the action methods below and runs to completion before the
//! next one; derived state (diff set, decorations, search matches, hidden
//! keys) is recomputed on read.
//!
//! The auto-merge tree and the Diff Set depend only on A, B and the truth
//! side, so they are cached when the session is reseeded and tagged with
//! [`MergeSession::generation`].
//!
//! # Example
//!
//! ```
//! use json_merge::session::MergeSession;
//! use json_merge::types::{Pane, Pick, Side};
//! use json_merge::decorate::Highlight;
//! use serde_json::json;
//!
//! let mut session = MergeSession::default();
//! session.set_source(Side::A, json!({"a": {"x": 1}}));
//! session.set_source(Side::B, json!({"a": {"x": 2}}));
//! assert_eq!(session.result(), &json!({"a": {"x": 1}}));
//!
//! session.use_side(Side::B, "a.x").unwrap();
//! assert_eq!(session.result(), &json!({"a": {"x": 2}}));
//! assert_eq!(session.pick("a.x"), Pick::B);
//! assert_eq!(
//!     session.decoration_for(Pane::R, "a.x").highlight,
//!     Some(Highlight::Conflict)
//! );
//! ```

mod options;

pub use options::{SessionOptions, ViewMode};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use json_merge_path::{
    coerce_to_string, delete, get, is_within, normalize_loaded_json, set, sort_json_deep,
    union_leaf_paths, validate_new_key, KeyConflict, SortOrder,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::auto_merge::{build_auto_result_tree, PickMap};
use crate::decorate::{decoration_for, decorations_for_pane, Deco, Decoration, DecorationState};
use crate::diff::{make_diff_set, DiffSet};
use crate::error::{ParseError, SessionError};
use crate::filter::{diff_only_tree, hidden_keys_for_pane};
use crate::flat::{parse_flat_text_to_tree, to_flat_text};
use crate::formats::{parse_by_type, stringify_as, DocType};
use crate::json_text::{parse_buffer, parse_json, stringify};
use crate::offset_index::{build_json_index, JsonIndex};
use crate::repair::fix_json_text;
use crate::search::{matches_in_pane, matching_paths, PaneRoots, SearchOptions};
use crate::types::{Pane, Pick, Side};

/// A document ready to be saved or offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write the file into `dir` under its own name.
    pub fn save_in(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Default)]
struct PaneErrors {
    a: Option<String>,
    b: Option<String>,
    r: Option<String>,
}

impl PaneErrors {
    fn slot(&mut self, pane: Pane) -> &mut Option<String> {
        match pane {
            Pane::A => &mut self.a,
            Pane::B => &mut self.b,
            Pane::R => &mut self.r,
        }
    }

    fn get(&self, pane: Pane) -> Option<&str> {
        match pane {
            Pane::A => self.a.as_deref(),
            Pane::B => self.b.as_deref(),
            Pane::R => self.r.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeSession {
    options: SessionOptions,
    a: Value,
    b: Value,
    auto: Value,
    diff: DiffSet,
    result: Value,
    result_text: String,
    picks: PickMap,
    added: BTreeSet<String>,
    errors: PaneErrors,
    dirty: bool,
    query: String,
    match_index: usize,
    selected: String,
    reveal: Option<String>,
    generation: u64,
}

impl Default for MergeSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl MergeSession {
    /// Empty session: both sources and the Result are `{}`.
    pub fn new(options: SessionOptions) -> Self {
        let empty = Value::Object(Map::new());
        let mut session = Self {
            options,
            a: empty.clone(),
            b: empty.clone(),
            auto: empty.clone(),
            diff: DiffSet::new(),
            result: empty,
            result_text: String::new(),
            picks: PickMap::new(),
            added: BTreeSet::new(),
            errors: PaneErrors::default(),
            dirty: false,
            query: String::new(),
            match_index: 0,
            selected: String::new(),
            reveal: None,
            generation: 0,
        };
        session.reseed();
        session
    }

    pub fn with_sources(a: Value, b: Value, options: SessionOptions) -> Self {
        let mut session = Self::new(options);
        session.a = a;
        session.b = b;
        session.reseed();
        session
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn source(&self, side: Side) -> &Value {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub fn result(&self) -> &Value {
        &self.result
    }

    /// The Result pane's JSON text buffer, which may not parse.
    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    pub fn truth(&self) -> Side {
        self.options.truth
    }

    /// Auto-merge tree of the current sources and truth side.
    pub fn auto_result(&self) -> &Value {
        &self.auto
    }

    pub fn diff_set(&self) -> &DiffSet {
        &self.diff
    }

    pub fn picks(&self) -> &PickMap {
        &self.picks
    }

    pub fn pick(&self, path: &str) -> Pick {
        self.picks.get(path).copied().unwrap_or_default()
    }

    pub fn added_keys(&self) -> &BTreeSet<String> {
        &self.added
    }

    pub fn error(&self, pane: Pane) -> Option<&str> {
        self.errors.get(pane)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bumped every time the Result is reseeded from the auto-merge.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn match_index(&self) -> usize {
        self.match_index
    }

    pub fn selected_key(&self) -> &str {
        &self.selected
    }

    /// Path the editor should scroll to, if any.
    pub fn reveal_key(&self) -> Option<&str> {
        self.reveal.as_deref()
    }

    fn roots(&self) -> PaneRoots<'_> {
        PaneRoots {
            a: &self.a,
            b: &self.b,
            r: &self.result,
        }
    }

    fn pane_tree(&self, pane: Pane) -> &Value {
        self.roots().root(pane)
    }

    // ── Sources and reseeding ───────────────────────────────────────────

    /// Replace a source tree as given and reseed the Result.
    pub fn set_source(&mut self, side: Side, value: Value) {
        match side {
            Side::A => self.a = value,
            Side::B => self.b = value,
        }
        self.reseed();
    }

    /// Parse `text` as `doc_type` into source `side`.
    ///
    /// On failure the pane's error is set and its tree is left unchanged.
    pub fn load_text(&mut self, side: Side, text: &str, doc_type: DocType) -> Result<(), ParseError> {
        let pane = Pane::from(side);
        match parse_by_type(doc_type, text) {
            Ok(value) => {
                info!(side = %side, format = %doc_type, "source loaded");
                *self.errors.slot(pane) = None;
                self.set_source(side, value);
                Ok(())
            }
            Err(err) => {
                warn!(side = %side, format = %doc_type, error = %err, "source rejected");
                *self.errors.slot(pane) = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Read a file into source `side`, choosing the format by extension.
    pub fn import_file(&mut self, side: Side, path: &Path) -> Result<(), SessionError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(side = %side, path = %path.display(), error = %err, "cannot read source");
                *self.errors.slot(Pane::from(side)) = Some(err.to_string());
                return Err(err.into());
            }
        };
        self.load_text(side, &text, DocType::from_path(path))?;
        Ok(())
    }

    /// Change the truth side and reseed; picks and added keys are dropped.
    pub fn set_truth(&mut self, truth: Side) {
        self.options.truth = truth;
        self.reseed();
    }

    /// Discard all manual work and rebuild the Result with `side` as truth.
    pub fn take_all_from(&mut self, side: Side) {
        debug!(side = %side, picks = self.picks.len(), added = self.added.len(), "take all");
        self.set_truth(side);
    }

    fn reseed(&mut self) {
        self.auto = build_auto_result_tree(&self.a, &self.b, self.options.truth);
        self.diff = make_diff_set(&self.a, &self.b);
        self.result = self.auto.clone();
        self.result_text = stringify(&self.result, self.options.minify);
        self.picks.clear();
        self.added.clear();
        self.errors.r = None;
        self.dirty = false;
        self.generation += 1;
        debug!(
            generation = self.generation,
            truth = %self.options.truth,
            diff = self.diff.len(),
            "result reseeded"
        );
    }

    // ── Result mutation ─────────────────────────────────────────────────

    /// Install a new Result tree from an action.
    fn commit(&mut self, tree: Value) {
        self.result_text = stringify(&tree, self.options.minify);
        self.result = tree;
        self.errors.r = None;
        self.dirty = true;
        self.refresh_edited_picks();
    }

    fn patch_result(&mut self, path: &str, value: Value) -> Result<(), SessionError> {
        let mut tree = self.result.clone();
        set(&mut tree, path, value)?;
        self.commit(tree);
        Ok(())
    }

    /// Leaf paths whose Result value no longer matches the auto-merge.
    pub fn edited_keys(&self) -> BTreeSet<String> {
        self.all_leaf_keys()
            .into_iter()
            .filter(|k| {
                let baseline = get(&self.auto, k);
                let current = get(&self.result, k);
                (baseline.is_some() || current.is_some())
                    && coerce_to_string(baseline) != coerce_to_string(current)
            })
            .collect()
    }

    /// Edited keys without an explicit A/B/ADDED pick.
    fn derived_edited(&self) -> BTreeSet<String> {
        self.edited_keys()
            .into_iter()
            .filter(|k| !matches!(self.pick(k), Pick::A | Pick::B | Pick::Added))
            .collect()
    }

    fn refresh_edited_picks(&mut self) {
        let edited = self.derived_edited();
        self.picks
            .retain(|path, pick| *pick != Pick::Edited || edited.contains(path));
        for path in edited {
            self.picks.insert(path, Pick::Edited);
        }
    }

    /// Take the value at `path` from source `side`.
    ///
    /// Returns `Ok(false)` without changes when the path is blank or the
    /// source has no value there.
    pub fn use_side(&mut self, side: Side, path: &str) -> Result<bool, SessionError> {
        let path = path.trim();
        if path.is_empty() {
            return Ok(false);
        }
        let Some(value) = get(self.source(side), path).cloned() else {
            return Ok(false);
        };
        self.patch_result(path, value)?;
        self.picks.insert(path.to_owned(), side.into());
        debug!(path, side = %side, "picked");
        Ok(true)
    }

    /// Return `path` to its auto-merge value, forgetting any pick.
    ///
    /// A path without a baseline value (an added key, for example) is removed.
    pub fn reset(&mut self, path: &str) -> Result<bool, SessionError> {
        let path = path.trim();
        if path.is_empty() {
            return Ok(false);
        }
        let mut tree = self.result.clone();
        match get(&self.auto, path) {
            Some(baseline) => set(&mut tree, path, baseline.clone())?,
            None => {
                delete(&mut tree, path);
            }
        }
        self.picks.remove(path);
        self.added.remove(path);
        self.commit(tree);
        debug!(path, "reset");
        Ok(true)
    }

    /// Add an operator-typed key. `value_text` is JSON; blank means `null`.
    ///
    /// A value that does not parse sets the Result error and changes nothing.
    pub fn add_key(&mut self, key: &str, value_text: &str) -> Result<bool, SessionError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(false);
        }
        let text = match value_text.trim() {
            "" => "null",
            t => t,
        };
        let value = match parse_json(text) {
            Ok(v) => normalize_loaded_json(v),
            Err(err) => {
                self.errors.r = Some(err.to_string());
                return Err(err.into());
            }
        };
        self.added.insert(key.to_owned());
        self.picks.insert(key.to_owned(), Pick::Added);
        if let Err(err) = self.patch_result(key, value) {
            self.added.remove(key);
            self.picks.remove(key);
            return Err(err);
        }
        self.selected = key.to_owned();
        debug!(path = key, "key added");
        Ok(true)
    }

    /// Check whether `path` can be added to the Result as a new key.
    pub fn check_new_key(&self, path: &str) -> Result<(), KeyConflict> {
        validate_new_key(&self.result, path)
    }

    /// Move the subtree at `from` to `to`.
    ///
    /// Works on one copy of the Result and commits it whole. When `to`
    /// already holds an object and the moved value is an object too, the two
    /// are merged key by key; otherwise `to` is overwritten. A blank or
    /// missing `from`, a blank `to`, or `from == to` is a no-op.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<bool, SessionError> {
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() || from == to {
            return Ok(false);
        }
        let mut tree = self.result.clone();
        let Some(moved) = delete(&mut tree, from) else {
            return Ok(false);
        };
        match get_mut_object(&mut tree, to) {
            Some(target) if moved.is_object() => merge_into(target, moved),
            _ => set(&mut tree, to, moved)?,
        }
        self.commit(tree);
        if is_within(from, &self.selected) {
            self.selected = format!("{to}{}", &self.selected[from.len()..]);
        }
        debug!(from, to, "renamed");
        Ok(true)
    }

    /// Remove the value at `path` from its parent.
    pub fn delete_block(&mut self, path: &str) -> bool {
        let path = path.trim();
        if path.is_empty() {
            return false;
        }
        let mut tree = self.result.clone();
        if delete(&mut tree, path).is_none() {
            return false;
        }
        self.commit(tree);
        debug!(path, "block deleted");
        true
    }

    pub fn can_rename(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn can_delete_block(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Rename the selected subtree to whatever `prompt` answers for it.
    /// `None` from the prompt cancels.
    pub fn open_rename<F>(&mut self, prompt: F) -> Result<bool, SessionError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let from = self.selected.trim().to_owned();
        if from.is_empty() {
            return Ok(false);
        }
        match prompt(&from) {
            Some(to) => self.rename(&from, &to),
            None => Ok(false),
        }
    }

    /// Delete the selected subtree if `confirm` agrees.
    pub fn open_delete_block<F>(&mut self, confirm: F) -> bool
    where
        F: FnOnce(&str) -> bool,
    {
        let path = self.selected.trim().to_owned();
        !path.is_empty() && confirm(&path) && self.delete_block(&path)
    }

    // ── Result text edits ───────────────────────────────────────────────

    /// Accept a new JSON text buffer for the Result.
    ///
    /// Text that does not parse is kept as typed; the Result tree keeps its
    /// last good value and the Result error is set. Either way the session
    /// becomes dirty.
    pub fn on_result_json_change(&mut self, text: &str) -> Result<(), ParseError> {
        self.result_text = text.to_owned();
        self.dirty = true;
        match parse_buffer(text) {
            Ok(tree) => {
                self.result = tree;
                self.errors.r = None;
                self.refresh_edited_picks();
                Ok(())
            }
            Err(err) => {
                self.errors.r = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Accept an edited flat text rendering of the Result.
    pub fn on_result_flat_change(&mut self, text: &str) -> Result<(), ParseError> {
        match parse_flat_text_to_tree(text) {
            Ok(tree) => {
                self.commit(tree);
                Ok(())
            }
            Err(err) => {
                self.errors.r = Some(err.to_string());
                self.dirty = true;
                Err(err)
            }
        }
    }

    /// Run tolerant repair over the Result buffer.
    pub fn fix_json(&mut self) -> Result<(), ParseError> {
        match fix_json_text(&self.result_text) {
            Ok(fixed) => {
                self.commit(fixed.value);
                Ok(())
            }
            Err(err) => {
                self.errors.r = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Deep-sort the Result buffer's keys in the current sort order.
    pub fn sort_result_now(&mut self) -> Result<(), ParseError> {
        match parse_buffer(&self.result_text) {
            Ok(tree) => {
                let sorted = sort_json_deep(&tree, self.options.sort);
                self.commit(sorted);
                Ok(())
            }
            Err(err) => {
                self.errors.r = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn set_sort(&mut self, order: SortOrder) -> Result<(), ParseError> {
        self.options.sort = order;
        self.sort_result_now()
    }

    /// Switch compact rendering. Re-renders a parseable buffer without
    /// marking the session dirty.
    pub fn set_minify(&mut self, minify: bool) {
        self.options.minify = minify;
        if let Ok(tree) = parse_buffer(&self.result_text) {
            self.result_text = stringify(&tree, minify);
            self.result = tree;
            self.errors.r = None;
        }
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.options.view = view;
    }

    pub fn set_only_diff(&mut self, only_diff: bool) {
        self.options.only_diff = only_diff;
    }

    pub fn set_search_options(&mut self, search: SearchOptions) {
        self.options.search = search;
    }

    pub fn can_download(&self) -> bool {
        parse_buffer(&self.result_text).is_ok()
    }

    pub fn can_fix(&self) -> bool {
        !self.result_text.trim().is_empty()
    }

    // ── Views ───────────────────────────────────────────────────────────

    /// Every leaf path of A, B and the Result, in the session sort order.
    pub fn all_leaf_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = union_leaf_paths(&[&self.a, &self.b, &self.result])
            .into_iter()
            .collect();
        self.options.sort.sort(&mut keys);
        keys
    }

    fn filtered(&self, tree: &Value) -> Value {
        if self.options.only_diff {
            diff_only_tree(tree, &self.diff)
        } else {
            tree.clone()
        }
    }

    /// Text shown in `pane` for the current view mode.
    ///
    /// The Result pane in JSON or tree mode shows the live buffer as typed.
    pub fn view_text(&self, pane: Pane) -> String {
        let flat = self.options.view == ViewMode::Flat;
        if pane == Pane::R && !flat {
            return self.result_text.clone();
        }
        let tree = self.filtered(self.pane_tree(pane));
        if flat {
            to_flat_text(&tree, self.options.sort)
        } else {
            stringify(&tree, self.options.minify)
        }
    }

    /// Offset index of the Result buffer.
    pub fn result_index(&self) -> JsonIndex {
        build_json_index(&self.result_text)
    }

    // ── Search and selection ────────────────────────────────────────────

    pub fn select_key(&mut self, key: &str) {
        self.selected = key.trim().to_owned();
    }

    /// Set the search query, selecting and revealing the first Result match.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_owned();
        self.match_index = 0;
        if query.trim().is_empty() {
            self.reveal = None;
            return;
        }
        if let Some(first) = self.matches(Pane::R).into_iter().next() {
            self.selected = first.clone();
            self.reveal = Some(first);
        }
    }

    pub fn is_match(&self, pane: Pane, path: &str) -> bool {
        matches_in_pane(&self.roots(), pane, path, &self.query, self.options.search)
    }

    /// Leaf paths matching the query in `pane`, in key order.
    pub fn matches(&self, pane: Pane) -> Vec<String> {
        matching_paths(
            &self.roots(),
            pane,
            &self.all_leaf_keys(),
            &self.query,
            self.options.search,
        )
    }

    pub fn matches_count(&self) -> usize {
        self.matches(Pane::R).len()
    }

    /// Move `step` matches forward (negative: backward) with wrap-around and
    /// select the match landed on.
    pub fn jump_to_match(&mut self, step: isize) -> Option<String> {
        let list = self.matches(Pane::R);
        if list.is_empty() {
            return None;
        }
        let n = list.len() as isize;
        let next = (self.match_index as isize + step).rem_euclid(n) as usize;
        self.match_index = next;
        let key = list[next].clone();
        self.selected = key.clone();
        self.reveal = Some(key.clone());
        Some(key)
    }

    /// Leaf paths hidden on `pane` by only-diff filtering or the query.
    pub fn hidden_keys(&self, pane: Pane) -> Vec<String> {
        hidden_keys_for_pane(
            &self.all_leaf_keys(),
            self.options.only_diff,
            &self.diff,
            &self.query,
            |k| self.is_match(pane, k),
        )
    }

    // ── Decorations ─────────────────────────────────────────────────────

    fn with_decoration_state<T>(&self, f: impl FnOnce(&DecorationState<'_>) -> T) -> T {
        let edited = self.derived_edited();
        let found: BTreeSet<String> = self.matches(Pane::R).into_iter().collect();
        let state = DecorationState {
            a: &self.a,
            b: &self.b,
            result: &self.result,
            truth: self.options.truth,
            picks: &self.picks,
            added: &self.added,
            edited: &edited,
            diff: &self.diff,
            found: &found,
        };
        f(&state)
    }

    pub fn decoration_for(&self, pane: Pane, path: &str) -> Decoration {
        self.with_decoration_state(|state| decoration_for(pane, path, state))
    }

    /// Decorations for every leaf key on `pane`.
    pub fn decorations(&self, pane: Pane) -> Vec<Deco> {
        let keys = self.all_leaf_keys();
        self.with_decoration_state(|state| decorations_for_pane(pane, &keys, state))
    }

    // ── Export ──────────────────────────────────────────────────────────

    fn export_filename(&self, doc_type: DocType) -> String {
        let name = match self.options.export_filename.trim() {
            "" => "merged.json",
            name => name,
        };
        match doc_type {
            DocType::Json => name.to_owned(),
            other => Path::new(name)
                .with_extension(other.extension())
                .to_string_lossy()
                .into_owned(),
        }
    }

    /// Export the Result buffer.
    ///
    /// JSON exports the buffer exactly as it stands; other formats re-render
    /// the parsed buffer through their codec.
    pub fn export(&self, doc_type: DocType) -> Result<ExportFile, SessionError> {
        let tree =
            parse_buffer(&self.result_text).map_err(|e| SessionError::InvalidResult(e.to_string()))?;
        let text = match doc_type {
            DocType::Json => self.result_text.clone(),
            other => stringify_as(other, &tree, self.options.minify)?,
        };
        Ok(ExportFile {
            filename: self.export_filename(doc_type),
            mime: doc_type.mime(),
            bytes: text.into_bytes(),
        })
    }
}

fn get_mut_object<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Map<String, Value>> {
    json_merge_path::get_mut(root, path)?.as_object_mut()
}

/// Merge `incoming` into `target`, recursing where both sides hold objects.
fn merge_into(target: &mut Map<String, Value>, incoming: Value) {
    let Value::Object(incoming) = incoming else {
        return;
    };
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(inner)) => {
                merge_into(existing, Value::Object(inner));
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorate::{DecoKind, Highlight};
    use serde_json::json;

    fn session(a: Value, b: Value) -> MergeSession {
        MergeSession::with_sources(a, b, SessionOptions::default())
    }

    #[test]
    fn test_new_session_is_clean() {
        let s = MergeSession::default();
        assert_eq!(s.result(), &json!({}));
        assert_eq!(s.result_text(), "{}");
        assert!(!s.is_dirty());
        assert_eq!(s.generation(), 1);
    }

    #[test]
    fn test_use_side_ignores_missing_values() {
        let mut s = session(json!({"a": 1}), json!({"b": 2}));
        assert!(!s.use_side(Side::A, "b").unwrap());
        assert!(!s.use_side(Side::A, "  ").unwrap());
        assert!(s.picks().is_empty());
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_direct_edit_tags_edited_and_reset_clears_it() {
        let mut s = session(json!({"a": 1, "b": 2}), json!({"a": 1}));
        s.on_result_json_change(r#"{"a": 5, "b": 2}"#).unwrap();
        assert_eq!(s.pick("a"), Pick::Edited);
        assert_eq!(s.decoration_for(Pane::R, "a").highlight, Some(Highlight::Edited));
        assert_eq!(s.decoration_for(Pane::A, "a").highlight, None);

        s.reset("a").unwrap();
        assert_eq!(s.result(), &json!({"a": 1, "b": 2}));
        assert!(s.picks().is_empty());
    }

    #[test]
    fn test_editing_back_to_baseline_drops_edited() {
        let mut s = session(json!({"a": 1}), json!({}));
        s.on_result_json_change(r#"{"a": 2}"#).unwrap();
        assert_eq!(s.pick("a"), Pick::Edited);
        s.on_result_json_change(r#"{"a": "1"}"#).unwrap();
        assert_eq!(s.pick("a"), Pick::Auto);
    }

    #[test]
    fn test_invalid_json_keeps_tree_and_marks_dirty() {
        let mut s = session(json!({"a": 1}), json!({}));
        assert!(s.on_result_json_change("{\"a\": ").is_err());
        assert_eq!(s.result(), &json!({"a": 1}));
        assert_eq!(s.result_text(), "{\"a\": ");
        assert!(s.error(Pane::R).is_some());
        assert!(s.is_dirty());
        assert!(!s.can_download());
        assert!(s.can_fix());
    }

    #[test]
    fn test_add_key_bad_value() {
        let mut s = MergeSession::default();
        assert!(s.add_key("k", "{oops").is_err());
        assert!(s.added_keys().is_empty());
        assert!(s.error(Pane::R).is_some());
        assert!(!s.add_key("  ", "1").unwrap());
    }

    #[test]
    fn test_add_key_blank_value_is_null() {
        let mut s = MergeSession::default();
        assert!(s.add_key("k", "  ").unwrap());
        assert_eq!(s.result(), &json!({"k": null}));
        assert_eq!(s.selected_key(), "k");
    }

    #[test]
    fn test_reset_removes_added_key() {
        let mut s = MergeSession::default();
        s.add_key("n", "1").unwrap();
        s.reset("n").unwrap();
        assert_eq!(s.result(), &json!({}));
        assert!(s.added_keys().is_empty());
        assert_eq!(s.pick("n"), Pick::Auto);
    }

    #[test]
    fn test_reset_after_edit_turned_object_into_array() {
        let mut s = session(json!({"xs": {"name": 1}}), json!({}));
        s.on_result_json_change(r#"{"xs": [5]}"#).unwrap();
        assert_eq!(s.pick("xs.name"), Pick::Edited);

        assert!(s.reset("xs.name").unwrap());
        assert_eq!(s.result(), &json!({"xs": {"name": 1}}));
        assert_eq!(get(s.result(), "xs.name"), get(s.auto_result(), "xs.name"));
        assert_eq!(s.pick("xs.name"), Pick::Auto);
        assert!(s.edited_keys().is_empty());
    }

    #[test]
    fn test_pick_after_edit_turned_object_into_array() {
        let mut s = session(json!({"xs": {"name": 1}}), json!({"xs": {"name": 2}}));
        s.on_result_json_change(r#"{"xs": [5]}"#).unwrap();

        assert!(s.use_side(Side::B, "xs.name").unwrap());
        assert_eq!(s.result(), &json!({"xs": {"name": 2}}));
        assert_eq!(s.pick("xs.name"), Pick::B);

        s.on_result_json_change(r#"{"xs": [5]}"#).unwrap();
        assert!(s.add_key("xs.extra", "3").unwrap());
        assert_eq!(s.result(), &json!({"xs": {"extra": 3}}));
        assert_eq!(s.pick("xs.extra"), Pick::Added);
    }

    #[test]
    fn test_rename_merges_into_existing_object() {
        let mut s = session(json!({"a": {"x": 1}, "z": {"y": 2}}), json!({}));
        s.select_key("a.x");
        assert!(s.rename("a", "z").unwrap());
        assert_eq!(s.result(), &json!({"z": {"y": 2, "x": 1}}));
        assert_eq!(s.selected_key(), "z.x");
    }

    #[test]
    fn test_rename_noops() {
        let mut s = session(json!({"a": 1}), json!({}));
        assert!(!s.rename("a", "a").unwrap());
        assert!(!s.rename("missing", "b").unwrap());
        assert!(!s.rename("a", " ").unwrap());
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_modal_callbacks() {
        let mut s = session(json!({"a": {"b": 1}, "c": 2}), json!({}));
        assert!(!s.open_delete_block(|_| true));
        s.select_key(" c ");
        assert!(!s.open_delete_block(|_| false));
        assert!(s.open_delete_block(|p| p == "c"));
        assert_eq!(s.result(), &json!({"a": {"b": 1}}));

        s.select_key("a");
        assert!(!s.open_rename(|_| None).unwrap());
        assert!(s.open_rename(|from| Some(format!("{from}2"))).unwrap());
        assert_eq!(s.result(), &json!({"a2": {"b": 1}}));
    }

    #[test]
    fn test_sort_and_minify() {
        let mut s = session(json!({"b": 1, "a": {"d": 1, "c": 2}}), json!({}));
        s.set_minify(true);
        assert_eq!(s.result_text(), r#"{"b":1,"a":{"d":1,"c":2}}"#);
        assert!(!s.is_dirty());
        s.set_sort(SortOrder::Asc).unwrap();
        assert_eq!(s.result_text(), r#"{"a":{"c":2,"d":1},"b":1}"#);
        assert!(s.is_dirty());
    }

    #[test]
    fn test_flat_edit() {
        let mut s = session(json!({"a": 1}), json!({}));
        s.on_result_flat_change("a = 1\nb.c = \"x\"").unwrap();
        assert_eq!(s.result(), &json!({"a": 1, "b": {"c": "x"}}));
        assert_eq!(s.pick("b.c"), Pick::Edited);

        let err = s.on_result_flat_change("oops").unwrap_err();
        assert_eq!(err, ParseError::MissingEquals { line: 1 });
        assert_eq!(s.error(Pane::R), Some("Line 1: expected \"=\""));
    }

    #[test]
    fn test_fix_json_buffer() {
        let mut s = MergeSession::default();
        let _ = s.on_result_json_change("{'a': 'b'}");
        s.fix_json().unwrap();
        assert_eq!(s.result(), &json!({"a": "b"}));
        assert_eq!(s.error(Pane::R), None);
    }

    #[test]
    fn test_view_text_modes() {
        let mut s = session(json!({"x": 1, "y": 2}), json!({"x": 1, "y": 3}));
        s.set_view(ViewMode::Flat);
        s.set_only_diff(true);
        assert_eq!(s.view_text(Pane::A), "y = 2");
        assert_eq!(s.view_text(Pane::R), "y = 2");
        s.set_view(ViewMode::Json);
        s.set_minify(true);
        assert_eq!(s.view_text(Pane::B), r#"{"y":3}"#);
        assert_eq!(s.view_text(Pane::R), r#"{"x":1,"y":2}"#);
    }

    #[test]
    fn test_search_navigation_wraps() {
        let mut s = session(json!({"k1": "a", "k2": "b", "other": "k"}), json!({}));
        s.set_query("K");
        assert_eq!(s.matches_count(), 3);
        assert_eq!(s.selected_key(), "k1");
        assert_eq!(s.reveal_key(), Some("k1"));
        assert_eq!(s.jump_to_match(1).as_deref(), Some("k2"));
        assert_eq!(s.jump_to_match(1).as_deref(), Some("other"));
        assert_eq!(s.jump_to_match(1).as_deref(), Some("k1"));
        assert_eq!(s.jump_to_match(-1).as_deref(), Some("other"));
        s.set_query(" ");
        assert_eq!(s.reveal_key(), None);
        assert_eq!(s.jump_to_match(1), None);
    }

    #[test]
    fn test_hidden_keys() {
        let mut s = session(json!({"same": 1, "d": 1}), json!({"same": 1, "d": 2}));
        s.set_only_diff(true);
        assert_eq!(s.hidden_keys(Pane::A), vec!["same"]);
        s.set_only_diff(false);
        s.set_query("sa");
        assert_eq!(s.hidden_keys(Pane::B), vec!["d"]);
    }

    #[test]
    fn test_find_decoration_follows_result_matches() {
        let mut s = session(json!({"k": "needle"}), json!({"k": "hay"}));
        s.set_truth(Side::B);
        s.set_query("needle");
        // Pane A holds "needle", but find marks come from the Result pane.
        assert!(s.is_match(Pane::A, "k"));
        assert!(!s.decoration_for(Pane::A, "k").find);
        s.use_side(Side::A, "k").unwrap();
        let decos = s.decorations(Pane::A);
        assert_eq!(decos[0].kind, DecoKind::Find);
        assert_eq!(decos[1].kind, DecoKind::Conflict);
    }

    #[test]
    fn test_export_formats() {
        let s = session(json!({"a": 1}), json!({}));
        let json_file = s.export(DocType::Json).unwrap();
        assert_eq!(json_file.filename, "merged.json");
        assert_eq!(json_file.bytes, s.result_text().as_bytes());

        let yaml = s.export(DocType::Yaml).unwrap();
        assert_eq!(yaml.filename, "merged.yaml");
        assert_eq!(String::from_utf8(yaml.bytes).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_export_rejects_broken_buffer() {
        let mut s = MergeSession::default();
        let _ = s.on_result_json_change("[1,");
        assert!(matches!(s.export(DocType::Json), Err(SessionError::InvalidResult(_))));
    }

    #[test]
    fn test_check_new_key() {
        let s = session(json!({"a": {"b": 1}}), json!({}));
        assert!(s.check_new_key("a.c").is_ok());
        assert_eq!(s.check_new_key("a"), Err(KeyConflict::Exists));
    }

    #[test]
    fn test_reseed_discards_manual_work() {
        let mut s = session(json!({"a": 1}), json!({"a": 2}));
        s.use_side(Side::B, "a").unwrap();
        s.add_key("n", "1").unwrap();
        let before = s.generation();
        s.take_all_from(Side::B);
        assert_eq!(s.result(), &json!({"a": 2}));
        assert!(s.picks().is_empty());
        assert!(s.added_keys().is_empty());
        assert!(!s.is_dirty());
        assert_eq!(s.generation(), before + 1);
    }

    #[test]
    fn test_load_text_failure_keeps_tree() {
        let mut s = session(json!({"a": 1}), json!({}));
        assert!(s.load_text(Side::A, "{", DocType::Json).is_err());
        assert_eq!(s.source(Side::A), &json!({"a": 1}));
        assert!(s.error(Pane::A).is_some());
        s.load_text(Side::A, "a: 2", DocType::Yaml).unwrap();
        assert_eq!(s.source(Side::A), &json!({"a": 2}));
        assert_eq!(s.error(Pane::A), None);
    }
}
