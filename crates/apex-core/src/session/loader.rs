//! Opening an edit session
//!
//! Loading runs in a fixed order: every reference collection settles
//! (fetched or degraded to empty), then in view mode the incident is
//! re-fetched, then the record is normalized and the session becomes ready.

use super::state::{PhaseTracker, SessionPhase};
use super::{IncidentEditSession, SessionId};
use crate::error::SessionError;
use crate::notice::{NoticeBoard, NoticeKind};
use crate::settings::SessionSettings;
use apex_access::{clamp_tab, PermissionSet};
use apex_client::{ApiClient, ClientError};
use apex_model::{normalize, RawIncident, ReferenceCollection, ReferenceData, ReferenceKind};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Who is editing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionUser {
    /// Current user id, if known
    pub id: Option<i64>,
    /// Free-form team label
    pub team_label: String,
}

impl SessionUser {
    /// Create user
    #[inline]
    #[must_use]
    pub fn new(id: Option<i64>, team_label: impl Into<String>) -> Self {
        Self {
            id,
            team_label: team_label.into(),
        }
    }
}

/// What to open
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Incident as the caller has it
    pub incident: Arc<RawIncident>,
    /// Open in view mode
    pub read_only: bool,
    /// Current user
    pub user: SessionUser,
}

impl SessionRequest {
    /// Editable session for `user`
    #[inline]
    #[must_use]
    pub fn new(incident: Arc<RawIncident>, user: SessionUser) -> Self {
        Self {
            incident,
            read_only: false,
            user,
        }
    }

    /// Set view mode
    #[inline]
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// A reference fetch that can degrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    /// A master-data collection
    Collection(ReferenceKind),
    /// The user directory
    Users,
}

impl std::fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection(kind) => write!(f, "{kind}"),
            Self::Users => f.write_str("users"),
        }
    }
}

/// A reference fetch that failed and was replaced by an empty collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFailure {
    /// What failed
    pub source: ReferenceSource,
    /// Why
    pub error: ClientError,
}

/// Result of the reference batch
#[derive(Debug, Clone, Default)]
pub struct ReferenceLoad {
    /// Loaded collections; failed ones are empty
    pub data: ReferenceData,
    /// Degraded fetches
    pub failures: Vec<ReferenceFailure>,
}

impl ReferenceLoad {
    /// Whether any fetch failed
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    fn warning(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let names: Vec<String> = self.failures.iter().map(|f| f.source.to_string()).collect();
        Some(format!(
            "some reference data could not be loaded: {}",
            names.join(", ")
        ))
    }
}

/// Builds an [`IncidentEditSession`]
#[derive(Debug)]
pub struct EditSessionLoader {
    id: SessionId,
    api: ApiClient,
    settings: SessionSettings,
    request: SessionRequest,
    tracker: PhaseTracker,
    notices: NoticeBoard,
    reference: Option<ReferenceLoad>,
}

impl EditSessionLoader {
    /// Create loader in `Uninitialized`
    #[must_use]
    pub fn new(api: ApiClient, settings: SessionSettings, request: SessionRequest) -> Self {
        let id = SessionId::new();
        Self {
            id,
            api,
            settings,
            request,
            tracker: PhaseTracker::new(id.to_string()),
            notices: NoticeBoard::new(),
            reference: None,
        }
    }

    /// Session id
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.tracker.current()
    }

    /// Observe phase changes
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.tracker.subscribe()
    }

    /// Fetch every reference collection and the user directory
    ///
    /// Runs at most once; later calls return the stored result. Individual
    /// failures degrade to empty collections and never fail the load.
    ///
    /// # Errors
    /// `SessionError::IllegalTransition` if the loader already moved past loading.
    pub async fn load_reference_data(&mut self) -> Result<&ReferenceLoad, SessionError> {
        let load = match self.reference.take() {
            Some(load) => load,
            None => self.fetch_reference().await?,
        };
        Ok(self.reference.insert(load))
    }

    async fn fetch_reference(&mut self) -> Result<ReferenceLoad, SessionError> {
        self.tracker.advance(SessionPhase::LoadingMasterData)?;

        let api = &self.api;
        let collections = join_all(
            ReferenceKind::ALL
                .into_iter()
                .map(|kind| async move { (kind, api.fetch_collection(kind).await) }),
        );
        let (collections, users) = tokio::join!(collections, api.fetch_users());

        let mut load = ReferenceLoad::default();
        for (kind, result) in collections {
            let collection = result.unwrap_or_else(|error| {
                warn!(session = %self.id, %kind, %error, "reference collection unavailable");
                load.failures.push(ReferenceFailure {
                    source: ReferenceSource::Collection(kind),
                    error,
                });
                ReferenceCollection::new()
            });
            load.data = load.data.with_collection(kind, collection);
        }
        let users = users.unwrap_or_else(|error| {
            warn!(session = %self.id, %error, "user directory unavailable");
            load.failures.push(ReferenceFailure {
                source: ReferenceSource::Users,
                error,
            });
            Vec::new()
        });
        load.data = load.data.with_users(users);

        if let Some(message) = load.warning() {
            self.notices
                .post(NoticeKind::Warning, message, self.settings.ttl_for(NoticeKind::Warning));
        }
        info!(
            session = %self.id,
            degraded = load.failures.len(),
            users = load.data.users().len(),
            "reference data loaded"
        );
        Ok(load)
    }

    /// Finish loading and hand over a ready session
    ///
    /// In view mode the incident is re-fetched first; if every endpoint
    /// fails the supplied `Arc` is adopted unchanged.
    ///
    /// # Errors
    /// `SessionError::IllegalTransition` only if the phase machine was misused.
    pub async fn open(mut self) -> Result<IncidentEditSession, SessionError> {
        self.load_reference_data().await?;
        let reference = self.reference.take().unwrap_or_default();

        let mut source = Arc::clone(&self.request.incident);
        if self.request.read_only {
            if let Some(id) = source.id() {
                self.tracker.advance(SessionPhase::RefetchingIncident)?;
                match self.api.fetch_incident(id).await {
                    Some(fresh) => source = Arc::new(fresh),
                    None => info!(session = %self.id, incident_id = id, "keeping supplied incident"),
                }
            }
        }

        let incident = normalize(&source, &reference.data);
        let permissions = PermissionSet::resolve(&self.request.user.team_label, self.request.read_only);
        let active_tab = clamp_tab(self.settings.initial_tab, &permissions.visible_tabs());

        self.tracker.advance(SessionPhase::Ready)?;

        Ok(IncidentEditSession {
            id: self.id,
            api: self.api,
            settings: self.settings,
            tracker: self.tracker,
            notices: self.notices,
            source,
            incident,
            reference: reference.data,
            reference_failures: reference.failures,
            read_only: self.request.read_only,
            user: self.request.user,
            active_tab,
            last_error: None,
            on_complete: None,
        })
    }
}
