//! Offset index: maps dotted paths to byte ranges in JSON source text.
//!
//! Built from a tolerant syntax tree rather than a parsed value, so ranges
//! stay accurate for text with comments, odd formatting or local damage.
//! Array elements are addressed by index, exactly as in the path model.
//!
//! # Example
//!
//! ```
//! use json_merge::offset_index::build_json_index;
//!
//! let text = r#"{"a": {"b": [10, 20]}}"#;
//! let index = build_json_index(text);
//!
//! let r = index.leaf["a.b.1"];
//! assert_eq!(&text[r.start..r.end], "20");
//! assert_eq!(index.path_at(r.start), Some("a.b.1"));
//!
//! let r = index.range("a").unwrap();
//! assert_eq!(&text[r.start..r.end], r#"{"b": [10, 20]}"#);
//! ```

pub mod syntax;

use std::collections::BTreeMap;

use json_merge_path::child_path;
use serde::Serialize;

use self::syntax::{parse_tree, NodeKind, SyntaxNode};

/// Half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathRange {
    pub start: usize,
    pub end: usize,
}

impl PathRange {
    fn of(node: &SyntaxNode) -> Self {
        Self {
            start: node.start,
            end: node.end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Cursor containment: an offset right after the last byte still counts.
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JsonIndex {
    /// Value token extents of primitives.
    pub leaf: BTreeMap<String, PathRange>,
    /// Full value extents of every non-root node.
    pub node: BTreeMap<String, PathRange>,
    /// Property-name token extents.
    pub key: BTreeMap<String, PathRange>,
}

impl JsonIndex {
    /// Deepest path whose range touches `offset`: a leaf value first, then a
    /// property name, then the innermost enclosing node.
    pub fn path_at(&self, offset: usize) -> Option<&str> {
        [&self.leaf, &self.key, &self.node]
            .into_iter()
            .find_map(|map| innermost(map, offset))
    }

    /// Range of the whole node at `path`, for reveal or collapse.
    pub fn range(&self, path: &str) -> Option<PathRange> {
        self.node.get(path).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_empty()
    }
}

fn innermost(map: &BTreeMap<String, PathRange>, offset: usize) -> Option<&str> {
    map.iter()
        .filter(|(_, r)| r.touches(offset))
        .min_by_key(|(_, r)| r.len())
        .map(|(path, _)| path.as_str())
}

/// Build the offset index of `text`. Unparseable text yields an empty index.
pub fn build_json_index(text: &str) -> JsonIndex {
    let mut index = JsonIndex::default();
    if let Some(root) = parse_tree(text) {
        walk(&root, "", &mut index);
    }
    index
}

fn walk(node: &SyntaxNode, path: &str, index: &mut JsonIndex) {
    if !path.is_empty() {
        index.node.insert(path.to_owned(), PathRange::of(node));
    }
    match node.kind {
        NodeKind::Object => {
            for property in &node.children {
                let (Some(key), Some(value)) = property.property_parts() else {
                    continue;
                };
                let Some(name) = key.text.as_deref() else {
                    continue;
                };
                let next = child_path(path, name);
                index.key.insert(next.clone(), PathRange::of(key));
                walk(value, &next, index);
            }
        }
        NodeKind::Array => {
            for (i, item) in node.children.iter().enumerate() {
                walk(item, &child_path(path, &i.to_string()), index);
            }
        }
        NodeKind::Property => {}
        _ => {
            if !path.is_empty() {
                index.leaf.insert(path.to_owned(), PathRange::of(node));
            }
        }
    }
}
