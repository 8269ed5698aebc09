//! HTTP transport

use crate::config::ApiConfig;
use crate::error::{ConfigError, TransportError};
use crate::token::{bearer_value, TokenSource};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed body; non-JSON bodies are strings, empty bodies are null
    pub body: Value,
}

impl ApiResponse {
    /// Create response
    #[inline]
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// `200 OK` with `body`
    #[inline]
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// 2xx status
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request/response boundary to the incident API
///
/// Paths are relative to the API base (`/master/sites`).
#[async_trait]
pub trait ApiTransport: Send + Sync + std::fmt::Debug {
    /// `GET path`
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError>;

    /// `POST path` with a JSON body
    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    config: ApiConfig,
    client: Client,
    tokens: Arc<dyn TokenSource>,
}

impl ReqwestTransport {
    /// Build the HTTP client for `config`
    ///
    /// # Errors
    /// `ConfigError` if the configuration is invalid or the client cannot be built.
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            config,
            client,
            tokens,
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder, path: &str) -> Result<RequestBuilder, TransportError> {
        match bearer_value(self.tokens.as_ref()) {
            Some(value) => {
                let header = HeaderValue::from_str(&value)
                    .map_err(|_| TransportError::InvalidRequest("stored token is not a valid header value".into()))?;
                Ok(request.header(AUTHORIZATION, header))
            }
            None => {
                warn!(path, "no stored token, sending request unauthenticated");
                Ok(request)
            }
        }
    }

    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<ApiResponse, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("failed to read response body: {e}")))?;

        debug!(path, status, "response received");
        Ok(ApiResponse::new(status, parse_body(&text)))
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("base_url", &self.config.base_url)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
        let request = self.client.get(self.config.endpoint(path));
        let request = self.authorize(request, path)?;
        self.execute(request, path).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        let request = self.client.post(self.config.endpoint(path)).json(body);
        let request = self.authorize(request, path)?;
        self.execute(request, path).await
    }
}

/// JSON if it parses, the raw text otherwise, null when empty
pub(crate) fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_body_shapes() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body(" \n"), Value::Null);
        assert_eq!(parse_body("{\"id\": 1}"), json!({"id": 1}));
        assert_eq!(parse_body("<html>Bad Gateway</html>"), json!("<html>Bad Gateway</html>"));
    }

    #[test]
    fn success_range() {
        assert!(ApiResponse::ok(Value::Null).is_success());
        assert!(ApiResponse::new(204, Value::Null).is_success());
        assert!(!ApiResponse::new(302, Value::Null).is_success());
        assert!(!ApiResponse::new(422, Value::Null).is_success());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = ApiConfig::new().with_timeout_secs(0);
        let tokens: Arc<dyn TokenSource> = Arc::new(crate::token::StaticToken::new("t"));
        assert!(ReqwestTransport::new(config, tokens).is_err());
    }
}
