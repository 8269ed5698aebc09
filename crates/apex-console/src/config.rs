//! Console configuration
//!
//! A TOML file with `[api]` and `[session]` sections, every field optional.
//! `APEX_*` environment variables override the `[api]` section.

use anyhow::Context;
use apex_client::ApiConfig;
use apex_core::SessionSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the console needs to open sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// API connection
    pub api: ApiConfig,
    /// Session tunables
    pub session: SessionSettings,
}

impl ConsoleConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    /// Malformed TOML or invalid API settings.
    pub fn from_toml_str(document: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(document).context("invalid console configuration")?;
        config.api.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise defaults; then apply the environment
    ///
    /// # Errors
    /// Unreadable or invalid file, or invalid environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let document = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Self::from_toml_str(&document)?
            }
            None => Self::default(),
        };
        config.api = config.api.with_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_access::IncidentTab;

    #[test]
    fn sections_are_optional() {
        let config = ConsoleConfig::from_toml_str(
            r#"
            [api]
            base_url = "http://localhost:9000/api"

            [session]
            completion_delay_ms = 0
            initial_tab = "history"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:9000/api");
        assert_eq!(config.api.timeout_secs, apex_client::DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.session.completion_delay_ms, 0);
        assert_eq!(config.session.initial_tab, IncidentTab::History);
        assert_eq!(ConsoleConfig::from_toml_str("").unwrap(), ConsoleConfig::default());
    }

    #[test]
    fn invalid_api_section_is_rejected() {
        assert!(ConsoleConfig::from_toml_str("[api]\ntimeout_secs = 0").is_err());
        assert!(ConsoleConfig::from_toml_str("[session]\ninitial_tab = \"sla\"").is_err());
    }
}
