//! Payload shape extraction
//!
//! The API wraps results inconsistently: `{success, data}`, `{data}`, a bare
//! array or a bare object. These helpers find the interesting part.

use serde_json::{Map, Value};

/// List of records from `{data: [...]}` or a bare array
#[must_use]
pub fn extract_list(payload: &Value) -> Option<&[Value]> {
    match payload {
        Value::Array(items) => Some(items),
        Value::Object(object) => match object.get("data") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Single record from a detail response
///
/// Recognized shapes, in order:
/// - `{success?, data: {...}}` or `{success?, data: [{...}, ...]}` (first element)
/// - a bare object carrying an `id`
/// - a bare array (first element)
///
/// `success: false` and empty arrays yield `None`.
#[must_use]
pub fn extract_record(payload: &Value) -> Option<Map<String, Value>> {
    match payload {
        Value::Object(object) if object.contains_key("data") || object.contains_key("success") => {
            if success_flag(payload) == Some(false) {
                return None;
            }
            match object.get("data") {
                Some(Value::Object(data)) => Some(data.clone()),
                Some(Value::Array(items)) => first_object(items),
                _ => None,
            }
        }
        Value::Object(object) if object.contains_key("id") => Some(object.clone()),
        Value::Array(items) => first_object(items),
        _ => None,
    }
}

/// Application-level `success` flag, if present
#[inline]
#[must_use]
pub fn success_flag(payload: &Value) -> Option<bool> {
    payload.get("success").and_then(Value::as_bool)
}

/// Non-blank top-level `message`
#[must_use]
pub fn message(payload: &Value) -> Option<&str> {
    payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
}

fn first_object(items: &[Value]) -> Option<Map<String, Value>> {
    items.first().and_then(Value::as_object).cloned()
}
