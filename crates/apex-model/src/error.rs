//! Error types for the incident model

/// Errors raised while reading untyped payloads into model types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Payload was expected to be a JSON object
    #[error("expected a JSON object for {what}, got {found}")]
    NotAnObject {
        /// What was being read
        what: &'static str,
        /// JSON type actually found
        found: &'static str,
    },

    /// Record carried no usable identifier
    #[error("{what} record has no usable id")]
    MissingId {
        /// What was being read
        what: &'static str,
    },

    /// Unknown tab, role or collection name
    #[error("unknown {what}: '{value}'")]
    UnknownName {
        /// Kind of name being parsed
        what: &'static str,
        /// Rejected input
        value: String,
    },
}

impl ModelError {
    /// Build a `NotAnObject` error describing the offending value
    #[must_use]
    pub fn not_an_object(what: &'static str, value: &serde_json::Value) -> Self {
        Self::NotAnObject {
            what,
            found: json_type_name(value),
        }
    }
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
