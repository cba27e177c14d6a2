//! Google Cloud Storage location configuration.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use stowage_core::{Config, Error, Result};

/// Configuration key holding the project that owns the buckets.
pub const CONFIG_PROJECT_ID: &str = "project_id";

/// Configuration key overriding the service endpoint.
pub const CONFIG_ENDPOINT: &str = "endpoint";

/// Configuration key holding an OAuth2 bearer token.
pub const CONFIG_ACCESS_TOKEN: &str = "access_token";

/// Configuration key bounding every backend call, in seconds.
pub const CONFIG_TIMEOUT_SECS: &str = "timeout_secs";

/// Configuration key overriding the HTTP user agent.
pub const CONFIG_USER_AGENT: &str = "user_agent";

/// Public Cloud Storage endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Typed view of a Google Cloud Storage location's configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct GcsConfig {
    /// Project that owns the buckets
    #[cfg_attr(feature = "config", arg(long = "gcs-project-id", env = "GCS_PROJECT_ID"))]
    pub project_id: String,

    /// Service endpoint (point at a fake GCS server for testing)
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-endpoint", env = "GCS_ENDPOINT", default_value = DEFAULT_ENDPOINT)
    )]
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// OAuth2 bearer token sent with every request
    #[cfg_attr(feature = "config", arg(long = "gcs-access-token", env = "GCS_ACCESS_TOKEN"))]
    #[serde(default)]
    pub access_token: Option<String>,

    /// Upper bound for every backend call in seconds (0 disables)
    #[cfg_attr(feature = "config", arg(long = "gcs-timeout", env = "GCS_TIMEOUT"))]
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header to send with requests
    #[cfg_attr(feature = "config", arg(long = "gcs-user-agent", env = "GCS_USER_AGENT"))]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl GcsConfig {
    /// Creates a configuration for `project_id` with defaults elsewhere.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            endpoint: default_endpoint(),
            access_token: None,
            timeout_secs: None,
            user_agent: None,
        }
    }

    /// Reads the typed configuration out of a configuration bag.
    ///
    /// # Errors
    ///
    /// Returns [`MissingConfig`](stowage_core::ErrorKind::MissingConfig) when
    /// `project_id` is absent or blank, and
    /// [`Validation`](stowage_core::ErrorKind::Validation) when
    /// `timeout_secs` is not an unsigned integer.
    pub fn from_config(config: &Config) -> Result<Self> {
        let project_id = config.get_non_empty(CONFIG_PROJECT_ID).ok_or_else(|| {
            Error::missing_config().with_message(format!("missing '{CONFIG_PROJECT_ID}'"))
        })?;

        let timeout_secs = config
            .get_non_empty(CONFIG_TIMEOUT_SECS)
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    Error::validation()
                        .with_message(format!("'{CONFIG_TIMEOUT_SECS}' must be whole seconds"))
                        .with_source(e)
                })
            })
            .transpose()?;

        Ok(Self {
            project_id: project_id.to_string(),
            endpoint: config
                .get_non_empty(CONFIG_ENDPOINT)
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(default_endpoint),
            access_token: config.get_non_empty(CONFIG_ACCESS_TOKEN).map(String::from),
            timeout_secs,
            user_agent: config.get_non_empty(CONFIG_USER_AGENT).map(String::from),
        })
    }

    /// Set the service endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the per-call timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Returns the per-call timeout, if one is set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("stowage/{}", env!("CARGO_PKG_VERSION")))
    }
}

impl fmt::Debug for GcsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcsConfig")
            .field("project_id", &self.project_id)
            .field("endpoint", &self.endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use stowage_core::ErrorKind;

    use super::*;

    #[test]
    fn test_from_config_defaults() {
        let config = Config::new().with(CONFIG_PROJECT_ID, "acme");
        let gcs = GcsConfig::from_config(&config).unwrap();

        assert_eq!(gcs.project_id, "acme");
        assert_eq!(gcs.endpoint, DEFAULT_ENDPOINT);
        assert!(gcs.access_token.is_none());
        assert!(gcs.timeout().is_none());
        assert!(gcs.effective_user_agent().starts_with("stowage/"));
    }

    #[test]
    fn test_missing_project_id() {
        let err = GcsConfig::from_config(&Config::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingConfig);

        let config = Config::new().with(CONFIG_PROJECT_ID, "");
        let err = GcsConfig::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingConfig);
    }

    #[test]
    fn test_optional_keys() {
        let config = Config::new()
            .with(CONFIG_PROJECT_ID, "acme")
            .with(CONFIG_ENDPOINT, "http://localhost:4443/")
            .with(CONFIG_ACCESS_TOKEN, "ya29.token")
            .with(CONFIG_TIMEOUT_SECS, "15");
        let gcs = GcsConfig::from_config(&config).unwrap();

        assert_eq!(gcs.endpoint, "http://localhost:4443");
        assert_eq!(gcs.access_token.as_deref(), Some("ya29.token"));
        assert_eq!(gcs.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_invalid_timeout() {
        let config = Config::new()
            .with(CONFIG_PROJECT_ID, "acme")
            .with(CONFIG_TIMEOUT_SECS, "soon");
        let err = GcsConfig::from_config(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_zero_timeout_disables() {
        let gcs = GcsConfig::new("acme").with_timeout(0);
        assert!(gcs.timeout().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let gcs = GcsConfig::new("acme").with_access_token("secret-token");
        let debug = format!("{gcs:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_serde_defaults() {
        let gcs: GcsConfig = serde_json::from_str(r#"{"project_id":"acme"}"#).unwrap();
        assert_eq!(gcs, GcsConfig::new("acme"));
    }
}
