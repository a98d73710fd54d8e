//! Error types.
//!
//! Every parse in this crate reports failure through a `Result`; the
//! `Display` text of an error is the message shown to the operator.

use json_merge_path::PathError;
use thiserror::Error;

use crate::formats::DocType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// serde_json's message, verbatim.
    #[error("{0}")]
    Json(String),
    #[error("Line {line}: expected \"=\"")]
    MissingEquals { line: usize },
    #[error("Line {line}: empty key")]
    EmptyKey { line: usize },
    #[error("Line {line}: {source}")]
    FlatPath {
        line: usize,
        #[source]
        source: PathError,
    },
    #[error("{format}: {message}")]
    Codec { format: DocType, message: String },
    #[error("{0}")]
    Csv(String),
    #[error("CSV input must start with a header row")]
    MissingCsvHeader,
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::Json(e.to_string())
    }
}

impl ParseError {
    pub(crate) fn codec(format: DocType, source: impl std::fmt::Display) -> Self {
        ParseError::Codec {
            format,
            message: source.to_string(),
        }
    }
}

/// Failures of session actions, file import and export.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Result is not valid JSON: {0}")]
    InvalidResult(String),
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;
