//! Apex API client
//!
//! REST boundary between the incident console and the Apex incident
//! management API.
//!
//! # Overview
//!
//! - **ApiConfig**: base URL, timeout and cache settings
//! - **ApiTransport**: request/response seam, with a reqwest implementation
//! - **ApiClient**: typed endpoints and payload-shape extraction
//! - **first_successful**: ordered fallback across alternative requests
//!
//! # Example
//!
//! ```rust,no_run
//! use apex_client::{ApiClient, ApiConfig, EnvToken};
//! use apex_model::ReferenceKind;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::from_env()?;
//! let client = ApiClient::from_config(&config, Arc::new(EnvToken::default()))?;
//! let sites = client.fetch_collection(ReferenceKind::Sites).await?;
//! println!("{} sites", sites.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod payload;
pub mod token;
pub mod transport;

// Re-exports
pub use cache::ReferenceCache;
pub use client::{collection_path, incident_paths, ApiClient, EDIT_INCIDENT_PATH, USERS_PATH};
pub use config::{ApiConfig, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::{ClientError, ConfigError, TransportError};
pub use fallback::first_successful;
pub use token::{EnvToken, StaticToken, TokenSource, DEFAULT_TOKEN_VARIABLE};
pub use transport::{ApiResponse, ApiTransport, ReqwestTransport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
