//! Save response interpretation

use crate::error::SessionError;
use apex_client::payload::{message, success_flag};
use apex_client::ApiResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::SessionId;

/// Handed to the completion callback after a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReceipt {
    /// Session that saved
    pub session_id: SessionId,
    /// Saved incident
    pub incident_id: i64,
    /// Server confirmation message, if any
    pub message: Option<String>,
    /// When the server confirmed the save
    pub saved_at: DateTime<Utc>,
}

/// Turn an edit response into success or the user-facing error
///
/// Precedence: field errors, then `message`, then the HTTP status.
pub(crate) fn interpret_save_response(response: &ApiResponse) -> Result<(), SessionError> {
    let body = &response.body;
    if response.is_success() && success_flag(body) != Some(false) {
        return Ok(());
    }

    if let Some(joined) = join_field_errors(body) {
        return Err(SessionError::Validation(joined));
    }
    if let Some(text) = message(body) {
        return Err(SessionError::Rejected(text.to_owned()));
    }
    Err(match response.status {
        401 => SessionError::AuthExpired,
        403 => SessionError::Forbidden,
        422 => SessionError::InvalidInput,
        status if (200..300).contains(&status) => SessionError::Unsuccessful,
        status => SessionError::Http { status },
    })
}

/// `errors` rendered as `field: a, b; other: c`
///
/// Accepts a per-field object (messages as a string or a list), a list of
/// messages, or a single string. Blank messages are skipped.
#[must_use]
pub fn join_field_errors(body: &Value) -> Option<String> {
    let joined = match body.get("errors")? {
        Value::Object(fields) => fields
            .iter()
            .filter_map(|(field, messages)| {
                let text = join_messages(messages, ", ")?;
                Some(format!("{field}: {text}"))
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => join_messages(other, "; ").unwrap_or_default(),
    };
    (!joined.is_empty()).then_some(joined)
}

fn join_messages(value: &Value, separator: &str) -> Option<String> {
    let parts: Vec<&str> = match value {
        Value::String(text) => vec![text.trim()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).map(str::trim).collect(),
        _ => Vec::new(),
    };
    let parts: Vec<&str> = parts.into_iter().filter(|part| !part.is_empty()).collect();
    (!parts.is_empty()).then(|| parts.join(separator))
}
