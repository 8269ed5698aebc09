//! API client configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Production API base URL
pub const DEFAULT_API_URL: &str = "https://apexwpc.apextechno.co.uk/api";
/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

const ENV_API_URL: &str = "APEX_API_URL";
const ENV_API_TIMEOUT_SECS: &str = "APEX_API_TIMEOUT_SECS";
const ENV_REFERENCE_CACHE_TTL_SECS: &str = "APEX_REFERENCE_CACHE_TTL_SECS";

/// Connection settings for the incident API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL all paths are joined to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Reference data cache lifetime in seconds; 0 disables the cache
    pub reference_cache_ttl_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            reference_cache_ttl_secs: 0,
        }
    }
}

impl ApiConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// With reference cache lifetime
    #[inline]
    #[must_use]
    pub fn with_reference_cache_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.reference_cache_ttl_secs = ttl_secs;
        self
    }

    /// Defaults overlaid with `APEX_*` environment variables
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed input, `InvalidValue` if validation fails.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` when the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&document)
    }

    /// Overlay values from a variable lookup (the environment, in production)
    ///
    /// Blank variables are ignored.
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` for non-numeric or zero timeouts.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = read(ENV_API_URL) {
            self.base_url = url;
        }
        if let Some(raw) = read(ENV_API_TIMEOUT_SECS) {
            self.timeout_secs = raw
                .parse()
                .map_err(|_| ConfigError::invalid(ENV_API_TIMEOUT_SECS, "must be a whole number of seconds"))?;
        }
        if let Some(raw) = read(ENV_REFERENCE_CACHE_TTL_SECS) {
            self.reference_cache_ttl_secs = raw.parse().map_err(|_| {
                ConfigError::invalid(ENV_REFERENCE_CACHE_TTL_SECS, "must be a whole number of seconds")
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check invariants
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` for an empty base URL or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("base_url", "must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "must be greater than zero"));
        }
        Ok(())
    }

    /// Absolute URL for an API path
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let suffix = path.trim_start_matches('/');
        format!("{base}/{suffix}")
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reference cache lifetime, if caching is enabled
    #[inline]
    #[must_use]
    pub fn reference_cache_ttl(&self) -> Option<Duration> {
        (self.reference_cache_ttl_secs > 0).then(|| Duration::from_secs(self.reference_cache_ttl_secs))
    }
}
