//! Core logic behind the `json-merge` binary.
//!
//! - `merge` - auto-merge two documents and render the Result
//! - `diff`  - list the leaf paths that differ
//! - `fix`   - run tolerant repair over a JSON file
//! - `index` - print the offset index of a JSON file

use std::fmt::Write as _;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::diff::leaf_statuses;
use crate::error::{ParseError, SessionError};
use crate::filter::diff_only_tree;
use crate::formats::{parse_by_type, stringify_as, DocType};
use crate::json_text::stringify;
use crate::offset_index::{build_json_index, PathRange};
use crate::repair::fix_json_text;
use crate::session::{MergeSession, SessionOptions, ViewMode};
use crate::types::{LeafStatus, Pane, Side};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Render(#[from] ParseError),
}

// ── Logging ───────────────────────────────────────────────────────────────

/// Install a stderr `fmt` subscriber.
///
/// The level is `warn`, `info` with one `-v` and `debug` with more;
/// `RUST_LOG` overrides it. Calling this twice is harmless.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ── Input ─────────────────────────────────────────────────────────────────

/// Read and parse a document, choosing the format by extension.
pub fn load_document(path: &Path) -> Result<Value, CliError> {
    let shown = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: shown.clone(),
        source,
    })?;
    let doc_type = DocType::from_path(path);
    debug!(path = %shown, format = %doc_type, "loading document");
    parse_by_type(doc_type, &text).map_err(|source| CliError::Parse { path: shown, source })
}

// ── merge ─────────────────────────────────────────────────────────────────

/// How `merge` renders the Result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutput {
    /// Output format. Default is JSON.
    pub format: DocType,
    /// Write `path = value` lines instead of a document. Default is false.
    pub flat: bool,
}

/// Auto-merge `a` and `b` and render the Result.
pub fn merge_files(
    a: &Path,
    b: &Path,
    options: SessionOptions,
    output: MergeOutput,
) -> Result<Vec<u8>, CliError> {
    let mut session = MergeSession::new(options);
    session.set_source(Side::A, load_document(a)?);
    session.set_source(Side::B, load_document(b)?);
    info!(
        truth = %session.truth(),
        diff = session.diff_set().len(),
        "merged"
    );

    if output.flat {
        session.set_view(ViewMode::Flat);
        let mut text = session.view_text(Pane::R);
        text.push('\n');
        return Ok(text.into_bytes());
    }
    if session.options().only_diff {
        let tree = diff_only_tree(session.result(), session.diff_set());
        let mut text = stringify_as(output.format, &tree, session.options().minify)?;
        if output.format == DocType::Json {
            text.push('\n');
        }
        return Ok(text.into_bytes());
    }

    let mut bytes = session.export(output.format)?.bytes;
    if output.format == DocType::Json {
        bytes.push(b'\n');
    }
    Ok(bytes)
}

// ── diff ──────────────────────────────────────────────────────────────────

/// One `status<TAB>path` line per leaf path that is not the same in both.
pub fn diff_report(a: &Value, b: &Value) -> String {
    let mut out = String::new();
    for (path, status) in leaf_statuses(a, b) {
        if status != LeafStatus::Same {
            let _ = writeln!(out, "{status}\t{path}");
        }
    }
    out
}

// ── fix ───────────────────────────────────────────────────────────────────

/// Repair JSON text and render it pretty-printed.
pub fn fix_text(text: &str) -> Result<String, CliError> {
    let repaired = fix_json_text(text)?;
    Ok(stringify(&repaired.value, false))
}

// ── index ─────────────────────────────────────────────────────────────────

/// Offset index listing: `kind path start..end` per entry, grouped by kind.
pub fn index_listing(text: &str) -> String {
    let index = build_json_index(text);
    let mut out = String::new();
    let groups: [(&str, &std::collections::BTreeMap<String, PathRange>); 3] =
        [("node", &index.node), ("key", &index.key), ("leaf", &index.leaf)];
    for (kind, map) in groups {
        for (path, range) in map {
            let _ = writeln!(out, "{kind} {path} {}..{}", range.start, range.end);
        }
    }
    out
}
