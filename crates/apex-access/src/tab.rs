//! Incident editor tabs

use apex_model::ModelError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tabs of the incident editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentTab {
    /// Incident details form
    Details,
    /// Actions taken
    Actions,
    /// Assignment to teams and users
    Assignment,
    /// Evidence attachments
    Evidence,
    /// Change history
    History,
    /// Knowledge base
    Knowledge,
}

impl IncidentTab {
    /// Every tab
    pub const ALL: [Self; 6] = [
        Self::Details,
        Self::Actions,
        Self::Assignment,
        Self::Evidence,
        Self::History,
        Self::Knowledge,
    ];

    /// Wire/display identifier
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Details => "details",
            Self::Actions => "actions",
            Self::Assignment => "assignment",
            Self::Evidence => "evidence",
            Self::History => "history",
            Self::Knowledge => "knowledge",
        }
    }
}

impl std::fmt::Display for IncidentTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentTab {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == wanted)
            .ok_or_else(|| ModelError::UnknownName {
                what: "tab",
                value: s.to_string(),
            })
    }
}

/// Keep `active` if it is visible, else fall back to the first visible tab
#[must_use]
pub fn clamp_tab(active: IncidentTab, visible: &[IncidentTab]) -> IncidentTab {
    if visible.contains(&active) {
        active
    } else {
        visible.first().copied().unwrap_or(IncidentTab::Details)
    }
}
