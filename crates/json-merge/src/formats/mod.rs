//! Document formats accepted on import and offered on export.
//!
//! Every format maps to and from `serde_json::Value`. Import always ends with
//! [`normalize_loaded_json`], so a flat map of dotted keys or a double-encoded
//! JSON string arrives as a tree no matter which codec read it.

mod csv;
mod xml;
mod yaml;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use json_merge_path::normalize_loaded_json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ParseError, Result};
use crate::json_text::{parse_json, stringify};

pub use self::csv::CsvCodec;
pub use self::xml::{XmlCodec, ATTRIBUTE_PREFIX, DECLARATION_KEY, TEXT_KEY};
pub use self::yaml::YamlCodec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    #[default]
    Json,
    Yaml,
    Xml,
    Csv,
}

impl DocType {
    pub const ALL: [DocType; 4] = [DocType::Json, DocType::Yaml, DocType::Xml, DocType::Csv];

    /// Match a file extension (without the dot), case-insensitively.
    pub fn from_extension(ext: &str) -> Option<DocType> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(DocType::Json),
            "yaml" | "yml" => Some(DocType::Yaml),
            "xml" => Some(DocType::Xml),
            "csv" => Some(DocType::Csv),
            _ => None,
        }
    }

    /// Format implied by a file name; unknown extensions are read as JSON.
    pub fn from_path(path: &Path) -> DocType {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(DocType::from_extension)
            .unwrap_or_default()
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocType::Json => "json",
            DocType::Yaml => "yaml",
            DocType::Xml => "xml",
            DocType::Csv => "csv",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            DocType::Json => "application/json;charset=utf-8",
            DocType::Yaml => "application/yaml;charset=utf-8",
            DocType::Xml => "application/xml;charset=utf-8",
            DocType::Csv => "text/csv;charset=utf-8",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocType::Json => "JSON",
            DocType::Yaml => "YAML",
            DocType::Xml => "XML",
            DocType::Csv => "CSV",
        })
    }
}

impl FromStr for DocType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        DocType::from_extension(s.trim()).ok_or_else(|| ParseError::UnsupportedFormat(s.to_owned()))
    }
}

/// Conversion between one text format and JSON values.
pub trait Codec {
    fn doc_type(&self) -> DocType;

    fn parse(&self, text: &str) -> Result<Value>;

    fn stringify(&self, value: &Value) -> Result<String>;
}

/// Plain JSON, pretty or minified on output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pub minify: bool,
}

impl Codec for JsonCodec {
    fn doc_type(&self) -> DocType {
        DocType::Json
    }

    fn parse(&self, text: &str) -> Result<Value> {
        parse_json(text)
    }

    fn stringify(&self, value: &Value) -> Result<String> {
        Ok(stringify(value, self.minify))
    }
}

/// Codec for `doc_type`; `minify` only affects JSON output.
pub fn codec_for(doc_type: DocType, minify: bool) -> Box<dyn Codec> {
    match doc_type {
        DocType::Json => Box::new(JsonCodec { minify }),
        DocType::Yaml => Box::new(YamlCodec),
        DocType::Xml => Box::new(XmlCodec),
        DocType::Csv => Box::new(CsvCodec),
    }
}

/// Parse `text` as `doc_type` and normalize the result for loading.
///
/// A leading byte order mark is ignored.
pub fn parse_by_type(doc_type: DocType, text: &str) -> Result<Value> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let value = codec_for(doc_type, false).parse(text)?;
    Ok(normalize_loaded_json(value))
}

/// Render `value` as `doc_type`.
pub fn stringify_as(doc_type: DocType, value: &Value, minify: bool) -> Result<String> {
    codec_for(doc_type, minify).stringify(value)
}
