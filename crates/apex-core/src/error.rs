//! Session errors
//!
//! Every failure surfaced to the user during an edit session. Messages are
//! shown as-is in the error notice.

use crate::session::SessionPhase;
use apex_client::TransportError;

/// Session errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Phase change not permitted by the state machine
    #[error("illegal session transition: {from} -> {to}")]
    IllegalTransition {
        /// Current phase
        from: SessionPhase,
        /// Requested phase
        to: SessionPhase,
    },

    /// Session was opened in view mode
    #[error("this incident is open in view mode and cannot be changed")]
    ReadOnly,

    /// Team lacks the edit capability
    #[error("you do not have permission to edit this incident")]
    PermissionDenied,

    /// No current user id
    #[error("cannot save without a signed-in user")]
    UnknownUser,

    /// Incident carries no id
    #[error("cannot save an incident without an id")]
    MissingIncidentId,

    /// Field-level validation errors, joined per field
    #[error("{0}")]
    Validation(String),

    /// Server-supplied failure message
    #[error("{0}")]
    Rejected(String),

    /// HTTP 401
    #[error("your session has expired, please sign in again")]
    AuthExpired,

    /// HTTP 403
    #[error("you are not allowed to perform this action")]
    Forbidden,

    /// HTTP 422 without details
    #[error("the submitted changes are invalid")]
    InvalidInput,

    /// Any other HTTP failure without details
    #[error("failed to update incident (HTTP {status})")]
    Http {
        /// HTTP status code
        status: u16,
    },

    /// 2xx with `success: false` and no details
    #[error("failed to update incident")]
    Unsuccessful,

    /// No HTTP response obtained
    #[error("network error, could not reach the incident service: {0}")]
    Network(String),

    /// Request could not be built locally, e.g. an unusable stored token
    #[error("could not prepare the request to the incident service: {0}")]
    InvalidRequest(String),
}

impl SessionError {
    /// Save was refused before any network call
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::ReadOnly | Self::PermissionDenied | Self::UnknownUser | Self::MissingIncidentId
        )
    }

    /// Server refused the credentials
    #[inline]
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthExpired | Self::Forbidden)
    }

    /// No response was obtained
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<TransportError> for SessionError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Network(detail) => Self::Network(detail),
            TransportError::InvalidRequest(detail) => Self::InvalidRequest(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(SessionError::PermissionDenied.is_precondition());
        assert!(SessionError::ReadOnly.is_precondition());
        assert!(!SessionError::Forbidden.is_precondition());
        assert!(SessionError::AuthExpired.is_auth_failure());
        assert!(SessionError::from(TransportError::Network("refused".into())).is_network());
    }

    #[test]
    fn network_message_is_distinct_from_http() {
        let network = SessionError::Network("connection refused".into()).to_string();
        let http = SessionError::Http { status: 500 }.to_string();
        assert!(network.starts_with("network error"));
        assert_ne!(network, http);
    }

    #[test]
    fn request_build_failure_is_not_network() {
        let error = SessionError::from(TransportError::InvalidRequest("invalid header value".into()));
        assert!(!error.is_network());
        assert_eq!(error, SessionError::InvalidRequest("invalid header value".into()));
        assert!(!error.to_string().starts_with("network error"));
    }
}
