//! Flat text view: one `path = <json>` line per leaf.
//!
//! ```text
//! a.b = 1
//! a.c = "hi"
//! xs.0 = true
//! ```
//!
//! Parsing is forgiving about values: anything that is not valid JSON is
//! kept as a raw string, and the placeholders `[string]`, `[number]`,
//! `[boolean]` and `[null]` stand for the empty value of that type.

use json_merge_path::{collect_leaf_paths, get, set, SortOrder};
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{ParseError, Result};
use crate::repair::normalize_quotes;

fn placeholder_regex() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\[(string|number|boolean|null)\]$").expect("valid regex"))
}

/// Render every leaf of `root` as a `path = <json>` line, keys ordered by `order`.
pub fn to_flat_text(root: &Value, order: SortOrder) -> String {
    let mut paths = collect_leaf_paths(root);
    order.sort(&mut paths);
    let mut out = String::new();
    for path in paths {
        let Some(value) = get(root, &path) else {
            continue;
        };
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&path);
        out.push_str(" = ");
        out.push_str(&value.to_string());
    }
    out
}

/// Interpret the right-hand side of a flat line.
///
/// # Example
///
/// ```
/// use json_merge::flat::parse_flat_value_smart;
/// use serde_json::json;
///
/// assert_eq!(parse_flat_value_smart(" 42 "), json!(42));
/// assert_eq!(parse_flat_value_smart("[Number]"), json!(0));
/// assert_eq!(parse_flat_value_smart("hello world"), json!("hello world"));
/// ```
pub fn parse_flat_value_smart(raw: &str) -> Value {
    let text = normalize_quotes(raw.trim());
    if let Some(caps) = placeholder_regex().captures(&text) {
        return match caps[1].to_ascii_lowercase().as_str() {
            "string" => Value::String(String::new()),
            "number" => Value::from(0),
            "boolean" => Value::Bool(false),
            _ => Value::Null,
        };
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// Trim a flat key and drop one wrapping quote character on either end.
fn clean_key(raw: &str) -> &str {
    let key = raw.trim();
    let key = key.strip_prefix(['"', '\'']).unwrap_or(key);
    key.strip_suffix(['"', '\'']).unwrap_or(key)
}

/// Parse flat text back into a tree.
///
/// Blank lines are skipped. The first `=` on a line separates key from value.
/// Line numbers in errors are 1-based.
///
/// # Errors
///
/// - [`ParseError::MissingEquals`] - a non-blank line has no `=`
/// - [`ParseError::EmptyKey`] - the key is empty after trimming and unquoting
/// - [`ParseError::FlatPath`] - the key cannot be placed in the tree built so far
pub fn parse_flat_text_to_tree(text: &str) -> Result<Value> {
    let mut root = Value::Object(Map::new());
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ParseError::MissingEquals { line: line_no });
        };
        let key = clean_key(raw_key);
        if key.is_empty() {
            return Err(ParseError::EmptyKey { line: line_no });
        }
        set(&mut root, key, parse_flat_value_smart(raw_value))
            .map_err(|source| ParseError::FlatPath { line: line_no, source })?;
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_flat_text_sorted() {
        let doc = json!({"b": {"y": "s", "x": 1}, "a": [true, null]});
        assert_eq!(
            to_flat_text(&doc, SortOrder::Asc),
            "a.0 = true\na.1 = null\nb.x = 1\nb.y = \"s\""
        );
        assert_eq!(
            to_flat_text(&doc, SortOrder::Desc),
            "b.y = \"s\"\nb.x = 1\na.1 = null\na.0 = true"
        );
    }

    #[test]
    fn test_to_flat_text_empty() {
        assert_eq!(to_flat_text(&json!({}), SortOrder::Asc), "");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(parse_flat_value_smart("[string]"), json!(""));
        assert_eq!(parse_flat_value_smart("[NUMBER]"), json!(0));
        assert_eq!(parse_flat_value_smart("[Boolean]"), json!(false));
        assert_eq!(parse_flat_value_smart("[null]"), json!(null));
        assert_eq!(parse_flat_value_smart("[other]"), json!("[other]"));
    }

    #[test]
    fn test_value_fallbacks() {
        assert_eq!(parse_flat_value_smart("\u{201C}x\u{201D}"), json!("x"));
        assert_eq!(parse_flat_value_smart("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_flat_value_smart("  "), json!(""));
        assert_eq!(parse_flat_value_smart("not json"), json!("not json"));
    }

    #[test]
    fn test_parse_flat_text() {
        let text = "a.b = 1\n\n\"a.c\" = \"x\"\r\n xs.1 = true \n";
        let tree = parse_flat_text_to_tree(text).unwrap();
        // Index-like segments never create arrays.
        assert_eq!(tree, json!({"a": {"b": 1, "c": "x"}, "xs": {"1": true}}));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let tree = parse_flat_text_to_tree("q = a=b").unwrap();
        assert_eq!(tree, json!({"q": "a=b"}));
    }

    #[test]
    fn test_missing_equals() {
        let err = parse_flat_text_to_tree("a = 1\nb").unwrap_err();
        assert_eq!(err, ParseError::MissingEquals { line: 2 });
        assert_eq!(err.to_string(), "Line 2: expected \"=\"");
    }

    #[test]
    fn test_empty_key() {
        let err = parse_flat_text_to_tree("'' = 1").unwrap_err();
        assert_eq!(err, ParseError::EmptyKey { line: 1 });
        assert_eq!(err.to_string(), "Line 1: empty key");
    }

    #[test]
    fn test_named_key_replaces_array() {
        let tree = parse_flat_text_to_tree("xs = [1]\nxs.k = 2").unwrap();
        assert_eq!(tree, json!({"xs": {"k": 2}}));
    }

    #[test]
    fn test_unplaceable_key() {
        let err = parse_flat_text_to_tree("xs = [1]\nxs.999999999 = 2").unwrap_err();
        assert!(matches!(err, ParseError::FlatPath { line: 2, .. }));
    }

    fn leaf_pairs(root: &Value) -> Vec<(String, Value)> {
        let mut paths = collect_leaf_paths(root);
        paths.sort();
        paths
            .into_iter()
            .map(|p| {
                let v = get(root, &p).cloned().unwrap_or(Value::Null);
                (p, v)
            })
            .collect()
    }

    #[test]
    fn test_round_trip_keeps_leaf_pairs() {
        let doc = json!({"a": {"b": 1.5, "c": "x y"}, "d": [1, {"e": null}], "f": false});
        let text = to_flat_text(&doc, SortOrder::Asc);
        let back = parse_flat_text_to_tree(&text).unwrap();
        assert_eq!(leaf_pairs(&back), leaf_pairs(&doc));
        assert_eq!(back["d"], json!({"0": 1, "1": {"e": null}}));
    }
}
