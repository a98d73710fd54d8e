//! Loose string coercion used for display-level equality.
//!
//! Two values are "the same" for diffing purposes when their string forms are
//! equal, so `1` and `"1"` compare equal while `1` and `2` do not. Missing
//! values and `null` both coerce to the empty string.

use serde_json::{Number, Value};

/// Coerce an optional value to its display string.
///
/// # Examples
///
/// ```
/// use json_merge_path::coerce_to_string;
/// use serde_json::json;
///
/// assert_eq!(coerce_to_string(None), "");
/// assert_eq!(coerce_to_string(Some(&json!(null))), "");
/// assert_eq!(coerce_to_string(Some(&json!("1"))), "1");
/// assert_eq!(coerce_to_string(Some(&json!(1.0))), "1");
/// assert_eq!(coerce_to_string(Some(&json!(1e-7))), "1e-7");
/// assert_eq!(coerce_to_string(Some(&json!([1, [2, null]]))), "1,2,");
/// assert_eq!(coerce_to_string(Some(&json!({"a": 1}))), "[object Object]");
/// ```
pub fn coerce_to_string(value: Option<&Value>) -> String {
    let mut out = String::new();
    if let Some(value) = value {
        write_coerced(value, &mut out);
    }
    out
}

/// Compare two optional values by their coerced string forms.
pub fn loosely_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    coerce_to_string(a) == coerce_to_string(b)
}

fn write_coerced(value: &Value, out: &mut String) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(n)),
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_coerced(item, out);
            }
        }
        Value::Object(_) => out.push_str("[object Object]"),
    }
}

fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_owned(),
        Some(f) if f.abs() >= 1e21 || f.abs() < 1e-6 => format_exponent(f),
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Shortest digits with a signed exponent, e.g. `1e-7` or `1.5e+21`.
fn format_exponent(f: f64) -> String {
    let text = format!("{f:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}
