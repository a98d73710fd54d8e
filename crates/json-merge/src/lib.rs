//! json-merge - path-addressed reconciliation of two JSON documents.
//!
//! Two source documents, A and B, are flattened into dotted leaf paths,
//! compared leaf by leaf, and merged into a Result document where one side
//! (the "truth") wins conflicts. Individual leaves can then be re-picked from
//! either side, edited, added, renamed or deleted, and every leaf on every
//! pane is classified for highlighting.
//!
//! Path addressing itself lives in the `json-merge-path` crate.
//!
//! # Example
//!
//! ```
//! use json_merge::auto_merge::build_auto_result_tree;
//! use json_merge::diff::make_diff_set;
//! use json_merge::types::Side;
//! use serde_json::json;
//!
//! let a = json!({"name": "x", "port": 80});
//! let b = json!({"name": "y", "debug": true});
//!
//! let merged = build_auto_result_tree(&a, &b, Side::A);
//! assert_eq!(merged, json!({"name": "x", "port": 80, "debug": true}));
//!
//! let diff: Vec<_> = make_diff_set(&a, &b).into_iter().collect();
//! assert_eq!(diff, vec!["debug", "name", "port"]);
//! ```

pub mod error;
pub mod types;

pub mod auto_merge;
pub mod diff;

pub mod decorate;
pub mod filter;
pub mod search;

pub mod flat;
pub mod json_text;
pub mod repair;

pub mod formats;
pub mod offset_index;

pub mod session;

pub mod json_cli;

pub use error::{ParseError, SessionError};
pub use session::{MergeSession, SessionOptions, ViewMode};
pub use types::{LeafStatus, Pane, Pick, Side};
