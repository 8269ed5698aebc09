//! Error types for the API client
//!
//! Provides error handling for:
//! - Configuration and client construction
//! - Transport failures (no HTTP response obtained)
//! - Endpoint-level failures (HTTP status, rejected payloads, bad shapes)

use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting has an unusable value
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Setting or environment variable name
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    /// Create invalid value error
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// No HTTP response was obtained
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or body read failure
    #[error("network error: {0}")]
    Network(String),

    /// Request could not be built
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Endpoint-level failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Transport failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-2xx HTTP status
    #[error("{path} returned HTTP {status}")]
    Status {
        /// Request path
        path: String,
        /// HTTP status code
        status: u16,
    },

    /// Application-level `success: false`
    #[error("{path} rejected the request: {message}")]
    Rejected {
        /// Request path
        path: String,
        /// Server message, or a generic one
        message: String,
    },

    /// Payload did not have a recognizable shape
    #[error("{path} returned an unexpected payload shape")]
    UnexpectedShape {
        /// Request path
        path: String,
    },
}

impl ClientError {
    /// Check if a retry could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Network(_)) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status, when one was received
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
