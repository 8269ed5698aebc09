//! Bearer token sources
//!
//! Token acquisition and refresh happen elsewhere; the client only asks
//! whether a token is currently stored.

/// Default environment variable for [`EnvToken`]
pub const DEFAULT_TOKEN_VARIABLE: &str = "APEX_API_TOKEN";

/// Supplies the stored bearer token, if any
#[cfg_attr(test, mockall::automock)]
pub trait TokenSource: Send + Sync {
    /// Currently stored token
    fn stored_token(&self) -> Option<String>;
}

/// Fixed token
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Create from a token string
    #[inline]
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

impl TokenSource for StaticToken {
    fn stored_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Token read from an environment variable on every request
#[derive(Debug, Clone)]
pub struct EnvToken {
    variable: String,
}

impl EnvToken {
    /// Read from `variable`
    #[inline]
    #[must_use]
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }

    /// Variable name
    #[inline]
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_VARIABLE)
    }
}

impl TokenSource for EnvToken {
    fn stored_token(&self) -> Option<String> {
        std::env::var(&self.variable).ok()
    }
}

/// `Authorization` header value for the stored token
///
/// Blank tokens count as absent.
pub(crate) fn bearer_value(source: &dyn TokenSource) -> Option<String> {
    source
        .stored_token()
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .map(|token| format!("Bearer {token}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_value_formats_stored_token() {
        let mut source = MockTokenSource::new();
        source
            .expect_stored_token()
            .times(1)
            .return_const(Some(" abc123 ".to_string()));
        assert_eq!(bearer_value(&source).as_deref(), Some("Bearer abc123"));
    }

    #[test]
    fn blank_or_missing_token_yields_nothing() {
        let mut blank = MockTokenSource::new();
        blank.expect_stored_token().return_const(Some("   ".to_string()));
        assert_eq!(bearer_value(&blank), None);

        let mut missing = MockTokenSource::new();
        missing.expect_stored_token().return_const(None::<String>);
        assert_eq!(bearer_value(&missing), None);
    }

    #[test]
    fn static_token_debug_is_redacted() {
        let token = StaticToken::new("secret");
        assert!(!format!("{token:?}").contains("secret"));
        assert_eq!(token.stored_token().as_deref(), Some("secret"));
    }
}
