//! Typed access to the incident API endpoints

use crate::cache::ReferenceCache;
use crate::config::ApiConfig;
use crate::error::{ClientError, ConfigError, TransportError};
use crate::fallback::first_successful;
use crate::payload::{extract_list, extract_record, message, success_flag};
use crate::token::TokenSource;
use crate::transport::{ApiResponse, ApiTransport, ReqwestTransport};
use apex_model::{RawIncident, ReferenceCollection, ReferenceKind, User};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Incident update endpoint
pub const EDIT_INCIDENT_PATH: &str = "/incident-handler/edit-incident";
/// User directory endpoint
pub const USERS_PATH: &str = "/users";

/// Endpoint for a reference collection
#[must_use]
pub fn collection_path(kind: ReferenceKind) -> String {
    format!("/master/{}", kind.slug())
}

/// Incident detail endpoints, in the order they are tried
#[must_use]
pub fn incident_paths(id: i64) -> [String; 3] {
    [
        format!("/incidents/{id}"),
        format!("/incident-handler/incident/{id}"),
        format!("/incident/{id}"),
    ]
}

/// Client for the incident API
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
    cache: Option<ReferenceCache>,
}

impl ApiClient {
    /// Create client over a transport, without caching
    #[inline]
    #[must_use]
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            cache: None,
        }
    }

    /// Create reqwest-backed client, caching reference data if configured
    ///
    /// # Errors
    /// `ConfigError` if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config.clone(), tokens)?;
        let mut client = Self::new(Arc::new(transport));
        if let Some(ttl) = config.reference_cache_ttl() {
            client = client.with_reference_cache(ReferenceCache::with_ttl(ttl));
        }
        Ok(client)
    }

    /// With reference data cache
    #[inline]
    #[must_use]
    pub fn with_reference_cache(mut self, cache: ReferenceCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Underlying transport
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn ApiTransport> {
        &self.transport
    }

    /// Fetch one master-data collection
    ///
    /// # Errors
    /// `ClientError` on transport failure, non-2xx status, `success: false`
    /// or an unrecognized payload.
    pub async fn fetch_collection(&self, kind: ReferenceKind) -> Result<ReferenceCollection, ClientError> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(kind).await {
                debug!(%kind, "reference collection served from cache");
                return Ok(cached.as_ref().clone());
            }
        }

        let items = self.fetch_list(&collection_path(kind)).await?;
        let collection = ReferenceCollection::from_values(&items);
        debug!(%kind, records = collection.len(), "reference collection fetched");

        if let Some(cache) = &self.cache {
            cache.insert(kind, collection.clone()).await;
        }
        Ok(collection)
    }

    /// Fetch the user directory
    ///
    /// Entries without an id are skipped.
    ///
    /// # Errors
    /// As [`Self::fetch_collection`].
    pub async fn fetch_users(&self) -> Result<Vec<User>, ClientError> {
        let items = self.fetch_list(USERS_PATH).await?;
        let users = items
            .iter()
            .filter_map(|item| match User::from_value(item) {
                Ok(user) => Some(user),
                Err(error) => {
                    debug!(%error, "skipping user entry");
                    None
                }
            })
            .collect();
        Ok(users)
    }

    /// Fetch the latest copy of an incident
    ///
    /// Tries each of [`incident_paths`] in order and returns the first
    /// recognizable record, or `None` when every endpoint failed.
    pub async fn fetch_incident(&self, id: i64) -> Option<RawIncident> {
        let paths = incident_paths(id);
        let found = first_successful(paths.iter().map(|path| move || self.fetch_record(path))).await;

        match &found {
            Some(_) => info!(incident_id = id, "incident re-fetched"),
            None => warn!(incident_id = id, "every incident endpoint failed"),
        }
        found
    }

    /// Submit an incident update
    ///
    /// The response is returned as-is; interpreting it is up to the caller.
    ///
    /// # Errors
    /// `TransportError` when no HTTP response was obtained.
    pub async fn edit_incident(&self, body: &Value) -> Result<ApiResponse, TransportError> {
        self.transport.post(EDIT_INCIDENT_PATH, body).await
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<Value>, ClientError> {
        let response = self.checked_get(path).await?;
        extract_list(&response.body)
            .map(<[Value]>::to_vec)
            .ok_or_else(|| ClientError::UnexpectedShape { path: path.to_owned() })
    }

    async fn fetch_record(&self, path: &str) -> Result<RawIncident, ClientError> {
        let response = self.checked_get(path).await?;
        extract_record(&response.body)
            .map(RawIncident::from)
            .ok_or_else(|| ClientError::UnexpectedShape { path: path.to_owned() })
    }

    async fn checked_get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        let response = self.transport.get(path).await?;
        if !response.is_success() {
            return Err(ClientError::Status {
                path: path.to_owned(),
                status: response.status,
            });
        }
        if success_flag(&response.body) == Some(false) {
            return Err(ClientError::Rejected {
                path: path.to_owned(),
                message: message(&response.body).unwrap_or("request was not successful").to_owned(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct RoutedTransport {
        routes: HashMap<String, ApiResponse>,
        requested: Mutex<Vec<String>>,
    }

    impl RoutedTransport {
        fn route(mut self, path: &str, response: ApiResponse) -> Self {
            self.routes.insert(path.to_owned(), response);
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().clone()
        }
    }

    #[async_trait]
    impl ApiTransport for RoutedTransport {
        async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
            self.requested.lock().push(path.to_owned());
            self.routes
                .get(path)
                .cloned()
                .ok_or_else(|| TransportError::Network(format!("no route for {path}")))
        }

        async fn post(&self, path: &str, _body: &Value) -> Result<ApiResponse, TransportError> {
            self.get(path).await
        }
    }

    #[test]
    fn paths() {
        assert_eq!(collection_path(ReferenceKind::ContactTypes), "/master/contact-types");
        assert_eq!(
            incident_paths(7),
            [
                "/incidents/7".to_string(),
                "/incident-handler/incident/7".to_string(),
                "/incident/7".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn collection_errors_are_typed() {
        let transport = RoutedTransport::default()
            .route("/master/sites", ApiResponse::new(500, json!("boom")))
            .route("/master/assets", ApiResponse::ok(json!({"success": false, "message": "denied"})))
            .route("/master/impacts", ApiResponse::ok(json!({"data": "nope"})));
        let client = ApiClient::new(Arc::new(transport));

        assert_eq!(
            client.fetch_collection(ReferenceKind::Sites).await.unwrap_err().status(),
            Some(500)
        );
        assert!(matches!(
            client.fetch_collection(ReferenceKind::Assets).await,
            Err(ClientError::Rejected { message, .. }) if message == "denied"
        ));
        assert!(matches!(
            client.fetch_collection(ReferenceKind::Impacts).await,
            Err(ClientError::UnexpectedShape { .. })
        ));
        assert!(matches!(
            client.fetch_collection(ReferenceKind::Urgencies).await,
            Err(ClientError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn users_skip_entries_without_id() {
        let transport = RoutedTransport::default().route(
            USERS_PATH,
            ApiResponse::ok(json!([{"id": 1, "name": "Ann"}, {"name": "ghost"}])),
        );
        let users = ApiClient::new(Arc::new(transport)).fetch_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].display_name, "Ann");
    }

    #[tokio::test]
    async fn incident_fetch_falls_through_in_order() {
        let transport = Arc::new(
            RoutedTransport::default()
                .route("/incidents/5", ApiResponse::new(404, Value::Null))
                .route("/incident-handler/incident/5", ApiResponse::new(500, Value::Null))
                .route("/incident/5", ApiResponse::ok(json!({"success": true, "data": {"id": 5}}))),
        );
        let client = ApiClient::new(transport.clone());

        let incident = client.fetch_incident(5).await.unwrap();
        assert_eq!(incident.id(), Some(5));
        assert_eq!(transport.requested(), incident_paths(5).to_vec());
    }

    #[tokio::test]
    async fn incident_fetch_stops_at_first_match() {
        let transport = Arc::new(
            RoutedTransport::default().route("/incidents/5", ApiResponse::ok(json!({"id": 5}))),
        );
        let client = ApiClient::new(transport.clone());

        assert!(client.fetch_incident(5).await.is_some());
        assert_eq!(transport.requested(), vec!["/incidents/5".to_string()]);
    }

    #[tokio::test]
    async fn cached_collection_skips_transport() {
        let transport = Arc::new(RoutedTransport::default().route(
            "/master/sites",
            ApiResponse::ok(json!({"data": [{"id": 1, "name": "HQ"}]})),
        ));
        let client = ApiClient::new(transport.clone())
            .with_reference_cache(ReferenceCache::with_ttl(std::time::Duration::from_secs(60)));

        let first = client.fetch_collection(ReferenceKind::Sites).await.unwrap();
        let second = client.fetch_collection(ReferenceKind::Sites).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.requested().len(), 1);
    }
}
