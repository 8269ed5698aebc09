//! Session timing and display settings

use crate::notice::NoticeKind;
use apex_access::IncidentTab;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for an edit session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Delay between a successful save and the completion callback
    pub completion_delay_ms: u64,
    /// Success notice lifetime
    pub success_ttl_secs: u64,
    /// Warning notice lifetime
    pub warning_ttl_secs: u64,
    /// Error notice lifetime
    pub error_ttl_secs: u64,
    /// Tab shown first, if visible
    pub initial_tab: IncidentTab,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            completion_delay_ms: 1500,
            success_ttl_secs: 3,
            warning_ttl_secs: 5,
            error_ttl_secs: 5,
            initial_tab: IncidentTab::Details,
        }
    }
}

impl SessionSettings {
    /// Completion callback delay
    #[inline]
    #[must_use]
    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }

    /// Lifetime of a notice of `kind`
    #[must_use]
    pub fn ttl_for(&self, kind: NoticeKind) -> Duration {
        let secs = match kind {
            NoticeKind::Success => self.success_ttl_secs,
            NoticeKind::Warning => self.warning_ttl_secs,
            NoticeKind::Error => self.error_ttl_secs,
        };
        Duration::from_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = SessionSettings::default();
        assert_eq!(settings.completion_delay(), Duration::from_millis(1500));
        assert_eq!(settings.ttl_for(NoticeKind::Success), Duration::from_secs(3));
        assert_eq!(settings.ttl_for(NoticeKind::Error), Duration::from_secs(5));
    }

    #[test]
    fn partial_documents_keep_defaults() {
        let settings: SessionSettings =
            serde_json::from_str(r#"{"completion_delay_ms": 0, "initial_tab": "history"}"#).unwrap();
        assert_eq!(settings.completion_delay_ms, 0);
        assert_eq!(settings.initial_tab, IncidentTab::History);
        assert_eq!(settings.warning_ttl_secs, 5);
    }
}
