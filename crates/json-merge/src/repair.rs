//! Tolerant JSON repair.
//!
//! Recovers near-valid JSON pasted from word processors or chat tools:
//! typographic quotes and non-breaking spaces are normalized first, and if the
//! text still does not parse, single-quoted keys and string values are
//! rewritten to double quotes before one more attempt. Bracket balancing and
//! trailing commas are out of reach on purpose.

use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::Result;
use crate::json_text::parse_buffer;

fn single_quoted_key_regex() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'([^'\\]*(?:\\.[^'\\]*)*)'\s*:").expect("valid regex"))
}

fn single_quoted_value_regex() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":\s*'([^'\\]*(?:\\.[^'\\]*)*)'").expect("valid regex"))
}

/// Output of a successful repair: the rewritten text and its parsed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub text: String,
    pub value: Value,
}

/// Replace curly double quotes, curly single quotes and non-breaking spaces
/// with their ASCII counterparts.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect()
}

fn double_quoted(inner: &str) -> String {
    format!("\"{}\"", inner.replace('"', "\\\""))
}

/// Rewrite `'key':` and `: 'value'` into their double-quoted forms, escaping
/// embedded double quotes.
pub fn fix_single_quotes(text: &str) -> String {
    let keys = single_quoted_key_regex().replace_all(text, |caps: &Captures<'_>| {
        format!("{}:", double_quoted(&caps[1]))
    });
    single_quoted_value_regex()
        .replace_all(&keys, |caps: &Captures<'_>| format!(": {}", double_quoted(&caps[1])))
        .into_owned()
}

/// Best-effort parse of near-valid JSON.
///
/// A blank buffer parses as `{}`. When both attempts fail the error of the
/// second attempt is returned unmodified.
///
/// # Example
///
/// ```
/// use json_merge::repair::fix_json_text;
/// use serde_json::json;
///
/// let fixed = fix_json_text("{'a': 'b'}").unwrap();
/// assert_eq!(fixed.value, json!({"a": "b"}));
///
/// let fixed = fix_json_text("{\u{201C}a\u{201D}: \u{201C}b\u{201D}}").unwrap();
/// assert_eq!(fixed.value, json!({"a": "b"}));
/// ```
pub fn fix_json_text(raw: &str) -> Result<Repaired> {
    let text = normalize_quotes(raw);
    if let Ok(value) = parse_buffer(&text) {
        return Ok(Repaired { text, value });
    }

    let text = fix_single_quotes(&text);
    let value = parse_buffer(&text)?;
    Ok(Repaired { text, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_json_untouched() {
        let fixed = fix_json_text(r#"{"a": 1}"#).unwrap();
        assert_eq!(fixed.text, r#"{"a": 1}"#);
        assert_eq!(fixed.value, json!({"a": 1}));
    }

    #[test]
    fn test_single_quotes_fixed() {
        let fixed = fix_json_text("{'a': 'b', 'n': 2}").unwrap();
        assert_eq!(fixed.value, json!({"a": "b", "n": 2}));
    }

    #[test]
    fn test_curly_single_quotes_normalized_then_fixed() {
        let fixed = fix_json_text("{\u{2018}a\u{2019}: \u{2018}b\u{2019}}").unwrap();
        assert_eq!(fixed.value, json!({"a": "b"}));
    }

    #[test]
    fn test_embedded_double_quotes_escaped() {
        let fixed = fix_json_text(r#"{'say': 'he said "hi"'}"#).unwrap();
        assert_eq!(fixed.value, json!({"say": "he said \"hi\""}));
    }

    #[test]
    fn test_nbsp_normalized() {
        let fixed = fix_json_text("{\"a\":\u{00A0}1}").unwrap();
        assert_eq!(fixed.value, json!({"a": 1}));
    }

    #[test]
    fn test_blank_is_empty_object() {
        assert_eq!(fix_json_text("   ").unwrap().value, json!({}));
    }

    #[test]
    fn test_trailing_comma_not_repaired() {
        let err = fix_json_text("{'a': 1,}").unwrap_err();
        let second = parse_buffer(&fix_single_quotes("{'a': 1,}")).unwrap_err();
        assert_eq!(err, second);
    }

    #[test]
    fn test_unbalanced_brackets_not_repaired() {
        assert!(fix_json_text("{\"a\": [1, 2}").is_err());
    }
}
