use std::path::Path;

use json_merge_path::SortOrder;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, SessionError};
use crate::search::SearchOptions;
use crate::types::Side;

/// How pane text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Pretty or minified JSON text.
    #[default]
    Json,
    /// Tree widget; pane text is the JSON rendering.
    Tree,
    /// One `path = <json>` line per leaf.
    Flat,
}

/// Options for a [`MergeSession`](super::MergeSession).
///
/// Every field has a default, so a config file only needs the keys it wants
/// to change:
///
/// ```
/// use json_merge::session::{SessionOptions, ViewMode};
/// use json_merge::types::Side;
///
/// let opts = SessionOptions::from_json_str(r#"{"truth": "B", "view": "flat"}"#).unwrap();
/// assert_eq!(opts.truth, Side::B);
/// assert_eq!(opts.view, ViewMode::Flat);
/// assert_eq!(opts.export_filename, "merged.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Side whose values win conflicts in the auto-merge. Default is A.
    pub truth: Side,
    /// Render JSON compactly. Default is false.
    pub minify: bool,
    /// Key order for sorted views and `sort_result_now`. Default is ascending.
    pub sort: SortOrder,
    pub view: ViewMode,
    /// Show only paths in the Diff Set. Default is false.
    pub only_diff: bool,
    pub search: SearchOptions,
    /// File name offered for JSON export; other formats swap the extension.
    pub export_filename: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            truth: Side::A,
            minify: false,
            sort: SortOrder::Asc,
            view: ViewMode::Json,
            only_diff: false,
            search: SearchOptions::default(),
            export_filename: "merged.json".to_owned(),
        }
    }
}

impl SessionOptions {
    pub fn from_json_str(text: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read options from a JSON config file.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text)?)
    }
}
