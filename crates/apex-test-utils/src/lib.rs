//! Testing utilities for the Apex workspace
//!
//! Shared fixtures and a scripted in-memory transport.

#![allow(missing_docs)]

use apex_client::{ApiClient, ApiResponse, ApiTransport, TransportError};
use apex_model::{RawIncident, ReferenceKind};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// In-memory transport answering from a route table
///
/// Unrouted paths answer `404` with a null body. Every request is recorded.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport serving the standard reference data fixtures
    pub fn with_reference_data() -> Self {
        let transport = Self::new();
        for kind in ReferenceKind::ALL {
            transport.on_get(&apex_client::collection_path(kind), ApiResponse::ok(collection_payload(kind)));
        }
        transport.on_get(apex_client::USERS_PATH, ApiResponse::ok(users_payload()));
        transport
    }

    pub fn on_get(&self, path: &str, response: ApiResponse) -> &Self {
        self.routes.lock().insert((Method::Get, path.to_owned()), Ok(response));
        self
    }

    pub fn on_post(&self, path: &str, response: ApiResponse) -> &Self {
        self.routes.lock().insert((Method::Post, path.to_owned()), Ok(response));
        self
    }

    pub fn fail_get(&self, path: &str, error: TransportError) -> &Self {
        self.routes.lock().insert((Method::Get, path.to_owned()), Err(error));
        self
    }

    pub fn fail_post(&self, path: &str, error: TransportError) -> &Self {
        self.routes.lock().insert((Method::Post, path.to_owned()), Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.path.clone()).collect()
    }

    pub fn posts(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == Method::Post)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn answer(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse, TransportError> {
        self.requests.lock().push(RecordedRequest {
            method,
            path: path.to_owned(),
            body,
        });
        self.routes
            .lock()
            .get(&(method, path.to_owned()))
            .cloned()
            .unwrap_or_else(|| Ok(ApiResponse::new(404, Value::Null)))
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
        self.answer(Method::Get, path, None)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
        self.answer(Method::Post, path, Some(body.clone()))
    }
}

/// Client over a shared scripted transport
pub fn scripted_client(transport: &Arc<ScriptedTransport>) -> ApiClient {
    ApiClient::new(transport.clone())
}

/// `{success, data}` payload for a standard reference collection
pub fn collection_payload(kind: ReferenceKind) -> Value {
    let data = match kind {
        ReferenceKind::Categories => json!([
            {"id": 1, "name": "Hardware"},
            {"id": 2, "name": "Software"},
        ]),
        ReferenceKind::SubCategories => json!([
            {"id": 10, "name": "Printer", "category_id": 1},
            {"id": 11, "name": "Laptop", "category_id": 1},
            {"id": 20, "name": "Email client", "category_id": 2},
        ]),
        ReferenceKind::ContactTypes => json!([
            {"id": 1, "name": "Phone"},
            {"id": 2, "name": "E-mail"},
        ]),
        ReferenceKind::Impacts | ReferenceKind::Urgencies => json!([
            {"id": 1, "name": "Low"},
            {"id": 2, "name": "Medium"},
            {"id": 3, "name": "High"},
        ]),
        ReferenceKind::IncidentStates => json!([
            {"id": 4, "name": "Closed"},
            {"id": 1, "name": "New"},
            {"id": 2, "name": "In Progress"},
            {"id": 3, "name": "Resolved"},
        ]),
        ReferenceKind::Sites => json!([
            {"id": 1, "premises": "Head Office", "catchment": "North"},
            {"id": 2, "name": "Warehouse"},
        ]),
        ReferenceKind::Assets => json!([
            {"id": 5, "name": "HP LaserJet 4200"},
        ]),
    };
    json!({"success": true, "data": data})
}

/// Bare-array user directory
pub fn users_payload() -> Value {
    json!([
        {"id": 7, "name": "Ann Handler", "team": "Incident Handler"},
        {"id": 8, "first_name": "Eve", "last_name": "User", "team_name": "End User"},
        {"id": 9, "username": "fe.bob", "team": {"name": "Field Engineer"}},
    ])
}

/// Incident in the mixed shapes the API produces
pub fn sample_incident() -> RawIncident {
    raw_incident(json!({
        "id": 42,
        "incident_no": "INC-00042",
        "shortDescription": "Printer jammed",
        "description": "Paper stuck in tray 2",
        "narration": "",
        "categoryName": "hardware",
        "site": {"id": 1},
        "urgency_id": 2,
        "impact": {"id": 3, "name": "High"},
        "incidentstate": {"id": 2, "name": "In Progress"},
        "reported_by": "Eve User",
    }))
}

/// Wrap a JSON object as a raw incident
///
/// # Panics
/// If `value` is not an object.
pub fn raw_incident(value: Value) -> RawIncident {
    RawIncident::from_value(value).expect("fixture incident must be an object")
}
