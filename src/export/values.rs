//! How typed field values turn into ink.
//!
//! Only `null`, the empty string, and arrays holding nothing else count as blank.
//! `0`, `"0"`, and `false` are real answers on a legal form and are always rendered.

use serde_json::Value;

#[cfg(test)]
#[path = "values_test.rs"]
mod tests;

/// Field values keyed by field key, as submitted by the form UI.
pub type FieldValues = serde_json::Map<String, Value>;

#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.iter().all(is_blank),
        _ => false,
    }
}

/// Text to draw for `value`, or `None` when the value is blank.
#[must_use]
pub fn display_string(value: &Value) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    Some(match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(display_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    })
}

/// Checkbox truthiness: only `true` and `"true"` check the box.
#[must_use]
pub fn is_checked(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    }
}

/// Encode `text` for a standard Type 1 font with `WinAnsiEncoding`.
///
/// Latin-1 characters map to their code point; anything else becomes `?`.
#[must_use]
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')).collect()
}
