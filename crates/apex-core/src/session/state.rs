//! Session phase state machine

use crate::error::SessionError;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

/// Lifecycle phase of an edit session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
    /// Nothing loaded yet
    Uninitialized,
    /// Reference collections are being fetched
    LoadingMasterData,
    /// View mode: fetching the latest copy of the incident
    RefetchingIncident,
    /// Editable/viewable
    Ready,
    /// Save request in flight
    Saving,
    /// Last operation failed; error notice shown
    Error,
}

impl SessionPhase {
    /// Whether a save may start from this phase
    #[inline]
    #[must_use]
    pub fn accepts_save(self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::LoadingMasterData => "loading-master-data",
            Self::RefetchingIncident => "re-fetching-incident",
            Self::Ready => "ready",
            Self::Saving => "saving",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Validates a phase transition
///
/// # Errors
/// `SessionError::IllegalTransition` if `to` is not reachable from `from`.
pub fn validate_transition(from: SessionPhase, to: SessionPhase) -> Result<(), SessionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SessionError::IllegalTransition { from, to })
    }
}

/// Phases reachable from `from`
#[must_use]
pub fn allowed_transitions(from: SessionPhase) -> Vec<SessionPhase> {
    use SessionPhase::{Error, LoadingMasterData, Ready, RefetchingIncident, Saving, Uninitialized};
    match from {
        Uninitialized => vec![LoadingMasterData],
        LoadingMasterData => vec![RefetchingIncident, Ready],
        RefetchingIncident => vec![Ready],
        Ready => vec![Saving, Error],
        Saving => vec![Ready, Error],
        Error => vec![Saving, Ready],
    }
}

/// Current phase, published to observers
#[derive(Debug)]
pub struct PhaseTracker {
    tx: watch::Sender<SessionPhase>,
    session: String,
}

impl PhaseTracker {
    /// Start in `Uninitialized`
    #[must_use]
    pub fn new(session: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(SessionPhase::Uninitialized);
        Self {
            tx,
            session: session.into(),
        }
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn current(&self) -> SessionPhase {
        *self.tx.borrow()
    }

    /// Observe phase changes
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.tx.subscribe()
    }

    /// Move to `to`
    ///
    /// # Errors
    /// `SessionError::IllegalTransition`; the phase is left unchanged.
    pub fn advance(&self, to: SessionPhase) -> Result<(), SessionError> {
        let from = self.current();
        validate_transition(from, to)?;
        self.tx.send_replace(to);
        if matches!(to, SessionPhase::Ready | SessionPhase::Error) {
            info!(session = %self.session, %from, %to, "session phase changed");
        } else {
            debug!(session = %self.session, %from, %to, "session phase changed");
        }
        Ok(())
    }

    /// Move to `to` unless already there
    ///
    /// # Errors
    /// As [`Self::advance`].
    pub fn settle(&self, to: SessionPhase) -> Result<(), SessionError> {
        if self.current() == to {
            return Ok(());
        }
        self.advance(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionPhase::{Error, LoadingMasterData, Ready, RefetchingIncident, Saving, Uninitialized};

    const ALL: [SessionPhase; 6] = [Uninitialized, LoadingMasterData, RefetchingIncident, Ready, Saving, Error];

    #[test]
    fn transition_table() {
        let legal = [
            (Uninitialized, LoadingMasterData),
            (LoadingMasterData, RefetchingIncident),
            (LoadingMasterData, Ready),
            (RefetchingIncident, Ready),
            (Ready, Saving),
            (Ready, Error),
            (Saving, Ready),
            (Saving, Error),
            (Error, Saving),
            (Error, Ready),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    validate_transition(from, to).is_ok(),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn ready_requires_loading_first() {
        assert_eq!(
            validate_transition(Uninitialized, Ready),
            Err(SessionError::IllegalTransition {
                from: Uninitialized,
                to: Ready
            })
        );
    }

    #[tokio::test]
    async fn tracker_publishes_changes() {
        let tracker = PhaseTracker::new("test");
        let mut rx = tracker.subscribe();

        tracker.advance(LoadingMasterData).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), LoadingMasterData);

        assert!(tracker.advance(Saving).is_err());
        assert_eq!(tracker.current(), LoadingMasterData);
    }

    #[test]
    fn settle_is_idempotent() {
        let tracker = PhaseTracker::new("test");
        tracker.advance(LoadingMasterData).unwrap();
        tracker.advance(Ready).unwrap();
        tracker.advance(Error).unwrap();
        assert!(tracker.settle(Error).is_ok());
        assert!(tracker.settle(Ready).is_ok());
        assert_eq!(tracker.current(), Ready);
    }
}
