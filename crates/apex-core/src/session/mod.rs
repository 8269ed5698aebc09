//! Incident edit sessions
//!
//! One session per open incident editor. A session owns its reference data
//! snapshot, the adopted incident record and its notices; nothing is shared
//! between sessions.

mod loader;
mod save;
mod state;

pub use loader::{EditSessionLoader, ReferenceFailure, ReferenceLoad, ReferenceSource, SessionRequest, SessionUser};
pub use save::{join_field_errors, SaveReceipt};
pub use state::{allowed_transitions, validate_transition, PhaseTracker, SessionPhase};

use crate::error::SessionError;
use crate::notice::{Notice, NoticeBoard, NoticeKind};
use crate::progression::StatusProgression;
use crate::settings::SessionSettings;
use crate::update::IncidentUpdate;
use apex_access::{clamp_tab, IncidentTab, PermissionSet};
use apex_client::payload::message;
use apex_client::ApiClient;
use apex_model::{normalize, Incident, RawIncident, ReferenceData};
use save::interpret_save_response;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use ulid::Ulid;

/// Message shown when the server confirms without one of its own
const DEFAULT_SUCCESS_MESSAGE: &str = "Incident updated successfully";

/// Unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(Ulid);

impl SessionId {
    /// Fresh id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Called once after a successful save, after the completion delay
pub type CompletionCallback = Arc<dyn Fn(SaveReceipt) + Send + Sync>;

/// An open incident editor
pub struct IncidentEditSession {
    id: SessionId,
    api: ApiClient,
    settings: SessionSettings,
    tracker: PhaseTracker,
    notices: NoticeBoard,
    source: Arc<RawIncident>,
    incident: Incident,
    reference: ReferenceData,
    reference_failures: Vec<ReferenceFailure>,
    read_only: bool,
    user: SessionUser,
    active_tab: IncidentTab,
    last_error: Option<SessionError>,
    on_complete: Option<CompletionCallback>,
}

impl IncidentEditSession {
    /// Load reference data, re-fetch in view mode, and return a ready session
    ///
    /// # Errors
    /// See [`EditSessionLoader::open`].
    pub async fn open(api: ApiClient, settings: SessionSettings, request: SessionRequest) -> Result<Self, SessionError> {
        EditSessionLoader::new(api, settings, request).open().await
    }

    /// With completion callback
    #[must_use]
    pub fn with_completion<F>(mut self, callback: F) -> Self
    where
        F: Fn(SaveReceipt) + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
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

    /// Normalized incident
    #[inline]
    #[must_use]
    pub fn incident(&self) -> &Incident {
        &self.incident
    }

    /// Adopted raw record
    ///
    /// The caller's own `Arc` when the view-mode re-fetch failed or was skipped.
    #[inline]
    #[must_use]
    pub fn source_incident(&self) -> &Arc<RawIncident> {
        &self.source
    }

    /// Reference data snapshot
    #[inline]
    #[must_use]
    pub fn reference_data(&self) -> &ReferenceData {
        &self.reference
    }

    /// Reference fetches that degraded to empty
    #[inline]
    #[must_use]
    pub fn reference_failures(&self) -> &[ReferenceFailure] {
        &self.reference_failures
    }

    /// Whether the session is in view mode
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Current user
    #[inline]
    #[must_use]
    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    /// Capabilities of the current user
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        PermissionSet::resolve(&self.user.team_label, self.read_only)
    }

    /// Tabs the current user may see
    #[must_use]
    pub fn visible_tabs(&self) -> Vec<IncidentTab> {
        self.permissions().visible_tabs()
    }

    /// Tab on display
    #[inline]
    #[must_use]
    pub fn active_tab(&self) -> IncidentTab {
        self.active_tab
    }

    /// Workflow progression of the current record
    #[must_use]
    pub fn status_progression(&self) -> StatusProgression {
        StatusProgression::compute(self.reference.incident_states(), &self.incident)
    }

    /// Visible error notice
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.notices.active(NoticeKind::Error).map(Notice::message)
    }

    /// Visible success notice
    #[must_use]
    pub fn success(&self) -> Option<&str> {
        self.notices.active(NoticeKind::Success).map(Notice::message)
    }

    /// Visible warning notice
    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        self.notices.active(NoticeKind::Warning).map(Notice::message)
    }

    /// Most recent failure, kept after its notice expires
    #[inline]
    #[must_use]
    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// Show `tab` if the user may see it
    ///
    /// Returns whether the active tab changed.
    pub fn switch_to(&mut self, tab: IncidentTab) -> bool {
        if tab == self.active_tab || !self.permissions().can_view(tab) {
            return false;
        }
        debug!(session = %self.id, %tab, "tab switched");
        self.active_tab = tab;
        true
    }

    /// Change the user's team and re-apply tab gating
    pub fn set_team_label(&mut self, team_label: impl Into<String>) {
        self.user.team_label = team_label.into();
        self.active_tab = clamp_tab(self.active_tab, &self.visible_tabs());
    }

    /// Clear the error notice and return to `Ready`
    pub fn dismiss_error(&mut self) {
        self.notices.dismiss(NoticeKind::Error);
        self.last_error = None;
        if self.phase() == SessionPhase::Error {
            if let Err(error) = self.tracker.advance(SessionPhase::Ready) {
                warn!(session = %self.id, %error, "could not leave error phase");
            }
        }
    }

    /// Submit `update`
    ///
    /// Returns `true` on success. Failures never propagate: they set the
    /// error notice and [`Self::last_error`] and move the session to `Error`.
    /// Precondition failures are reported without any network call.
    pub async fn save(&mut self, update: IncidentUpdate) -> bool {
        let (user_id, incident_id) = match self.save_preconditions() {
            Ok(ids) => ids,
            Err(error) => {
                self.fail(error);
                return false;
            }
        };
        if let Err(error) = self.tracker.advance(SessionPhase::Saving) {
            self.fail(error);
            return false;
        }

        info!(session = %self.id, incident_id, fields = update.fields().len(), "saving incident");
        let payload = update.to_payload(user_id, incident_id);
        let outcome = match self.api.edit_incident(&payload).await {
            Ok(response) => interpret_save_response(&response).map(|()| message(&response.body).map(str::to_owned)),
            Err(error) => Err(SessionError::from(error)),
        };

        match outcome {
            Ok(server_message) => {
                self.apply_saved(&update);
                self.complete(incident_id, server_message);
                true
            }
            Err(error) => {
                self.fail(error);
                false
            }
        }
    }

    fn save_preconditions(&self) -> Result<(i64, i64), SessionError> {
        let phase = self.phase();
        if !phase.accepts_save() {
            return Err(SessionError::IllegalTransition {
                from: phase,
                to: SessionPhase::Saving,
            });
        }
        if self.read_only {
            return Err(SessionError::ReadOnly);
        }
        if !self.permissions().can_edit_incident {
            return Err(SessionError::PermissionDenied);
        }
        let user_id = self.user.id.ok_or(SessionError::UnknownUser)?;
        let incident_id = self
            .incident
            .id
            .or_else(|| self.source.id())
            .ok_or(SessionError::MissingIncidentId)?;
        Ok((user_id, incident_id))
    }

    fn apply_saved(&mut self, update: &IncidentUpdate) {
        self.source = Arc::new(update.apply_to(&self.source));
        self.incident = normalize(&self.source, &self.reference);
    }

    fn complete(&mut self, incident_id: i64, server_message: Option<String>) {
        let text = server_message.clone().unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_owned());
        self.notices.dismiss(NoticeKind::Error);
        self.notices
            .post(NoticeKind::Success, text, self.settings.ttl_for(NoticeKind::Success));
        self.last_error = None;
        if let Err(error) = self.tracker.advance(SessionPhase::Ready) {
            warn!(session = %self.id, %error, "could not leave saving phase");
        }
        info!(session = %self.id, incident_id, "incident saved");

        if let Some(callback) = &self.on_complete {
            let callback = Arc::clone(callback);
            let delay = self.settings.completion_delay();
            let receipt = SaveReceipt {
                session_id: self.id,
                incident_id,
                message: server_message,
                saved_at: chrono::Utc::now(),
            };
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                callback(receipt);
            });
        }
    }

    fn fail(&mut self, error: SessionError) {
        warn!(session = %self.id, %error, "incident save failed");
        self.notices
            .post(NoticeKind::Error, error.to_string(), self.settings.ttl_for(NoticeKind::Error));
        self.last_error = Some(error);
        if let Err(transition) = self.tracker.settle(SessionPhase::Error) {
            warn!(session = %self.id, error = %transition, "could not enter error phase");
        }
    }
}

impl std::fmt::Debug for IncidentEditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentEditSession")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .field("incident_id", &self.incident.id)
            .field("read_only", &self.read_only)
            .field("active_tab", &self.active_tab)
            .finish_non_exhaustive()
    }
}
