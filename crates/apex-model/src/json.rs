//! Lenient readers for loosely typed API payloads
//!
//! The incident API is not consistent about how it encodes identifiers and
//! labels. These helpers are the only place that tolerance lives.

use serde_json::Value;

/// Read an identifier from an integer or an integer-looking string
#[inline]
#[must_use]
pub fn json_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Read a non-blank label, returned verbatim
#[inline]
#[must_use]
pub fn json_label(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => None,
    }
}

/// Read a non-empty text value, returned verbatim
#[inline]
#[must_use]
pub fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

/// Lower-case a label and drop every non-alphanumeric character
///
/// Used as the second, looser pass of name matching so that
/// `"Hard-Ware"` and `"hardware"` compare equal.
#[must_use]
pub fn alnum_fold(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        assert_eq!(json_id(&json!(7)), Some(7));
        assert_eq!(json_id(&json!(" 12 ")), Some(12));
        assert_eq!(json_id(&json!("twelve")), None);
        assert_eq!(json_id(&json!(1.5)), None);
        assert_eq!(json_id(&Value::Null), None);
    }

    #[test]
    fn labels_are_kept_verbatim() {
        assert_eq!(json_label(&json!("  Printer ")), Some("  Printer ".to_string()));
        assert_eq!(json_label(&json!("   ")), None);
        assert_eq!(json_label(&json!(3)), None);
    }

    #[test]
    fn text_keeps_whitespace_only_values() {
        assert_eq!(json_text(&json!(" ")), Some(" ".to_string()));
        assert_eq!(json_text(&json!("")), None);
    }

    #[test]
    fn alnum_fold_strips_punctuation_and_case() {
        assert_eq!(alnum_fold("Hard-Ware / Kit"), "hardwarekit");
        assert_eq!(alnum_fold("--"), "");
    }
}
