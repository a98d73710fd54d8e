//! JSON text view: tree to pretty/minified text and back.

use serde_json::{Map, Value};

use crate::error::Result;

/// Serialize `value` as pretty (2-space indent) or compact JSON.
///
/// Key order is whatever the value already has.
pub fn stringify(value: &Value, minify: bool) -> String {
    if minify {
        value.to_string()
    } else {
        format!("{value:#}")
    }
}

/// Parse JSON text.
pub fn parse_json(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Parse an editor buffer; a blank buffer is an empty object.
pub fn parse_buffer(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    parse_json(trimmed)
}
