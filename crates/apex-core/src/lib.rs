//! Apex incident edit sessions
//!
//! Opening, editing and saving one incident against the Apex API.
//!
//! # Overview
//!
//! - **EditSessionLoader**: fetches reference data (degrading per
//!   collection), re-fetches the incident in view mode, normalizes it
//! - **IncidentEditSession**: permission-gated tabs, saving with
//!   user-facing error interpretation, transient notices
//! - **SessionPhase**: explicit lifecycle state machine
//! - **StatusProgression**: workflow step indicator
//!
//! # Example
//!
//! ```rust,no_run
//! use apex_client::{ApiClient, ApiConfig, EnvToken};
//! use apex_core::prelude::*;
//! use apex_model::RawIncident;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = ApiClient::from_config(&ApiConfig::from_env()?, Arc::new(EnvToken::default()))?;
//! let incident = Arc::new(RawIncident::from_value(json!({"id": 42}))?);
//! let request = SessionRequest::new(incident, SessionUser::new(Some(7), "Incident Handler"));
//!
//! let mut session = IncidentEditSession::open(api, SessionSettings::default(), request).await?;
//! let saved = session.save(IncidentUpdate::new().narration("Replaced toner")).await;
//! assert_eq!(saved, session.error().is_none());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod notice;
pub mod progression;
pub mod session;
pub mod settings;
pub mod update;

// Re-exports
pub use error::SessionError;
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use progression::{current_state_id, Stage, StatusProgression, StepStatus, FALLBACK_STAGES};
pub use session::{
    allowed_transitions, validate_transition, CompletionCallback, EditSessionLoader, IncidentEditSession,
    ReferenceFailure, ReferenceLoad, ReferenceSource, SaveReceipt, SessionId, SessionPhase, SessionRequest,
    SessionUser,
};
pub use settings::SessionSettings;
pub use update::IncidentUpdate;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving an edit session
    pub use crate::{
        IncidentEditSession, IncidentUpdate, SessionError, SessionPhase, SessionRequest, SessionSettings,
        SessionUser,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
