//! Run configuration
//!
//! Settings come from command-line flags first and the environment second.

use crate::error::ConfigError;
use fnmigrate_model::target::DEFAULT_NAMESPACE;
use fnmigrate_model::DEFAULT_SNAPSHOT_FILE;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Environment variable holding the server URL
pub const SERVER_URL_ENV: &str = "FN_SERVER_URL";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for one migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrateConfig {
    /// Server URL as given, before normalization
    pub server_url: Option<String>,
    /// Snapshot file
    pub snapshot_path: PathBuf,
    /// Namespace for created records
    pub namespace: String,
    /// Per-request HTTP timeout
    pub timeout: Duration,
    /// Print the plan instead of creating anything
    pub dry_run: bool,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            namespace: DEFAULT_NAMESPACE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dry_run: false,
        }
    }
}

impl MigrateConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with the server taken from [`SERVER_URL_ENV`]
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server_url: std::env::var(SERVER_URL_ENV)
                .ok()
                .filter(|url| !url.is_empty()),
            ..Self::default()
        }
    }

    /// With server URL
    #[inline]
    #[must_use]
    pub fn with_server(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// With snapshot file
    #[inline]
    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    /// With target namespace
    #[inline]
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// With HTTP timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// With dry-run mode
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Base URL of the legacy API
    ///
    /// # Errors
    /// [`ConfigError::MissingServer`] or [`ConfigError::InvalidServer`].
    pub fn legacy_api_url(&self) -> Result<Url, ConfigError> {
        self.api_url("v1")
    }

    /// Base URL of the target API
    ///
    /// # Errors
    /// [`ConfigError::MissingServer`] or [`ConfigError::InvalidServer`].
    pub fn target_api_url(&self) -> Result<Url, ConfigError> {
        self.api_url("v2")
    }

    fn api_url(&self, version: &str) -> Result<Url, ConfigError> {
        let raw = self
            .server_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingServer)?;
        let joined = format!("{}/{version}", normalize_server_url(raw));
        let url = Url::parse(&joined).map_err(|e| ConfigError::InvalidServer {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidServer {
                url: raw.to_string(),
                reason: "not a hierarchical url".to_string(),
            });
        }
        Ok(url)
    }
}

/// Add `http://` when no scheme is given and drop one trailing slash
#[must_use]
pub fn normalize_server_url(raw: &str) -> String {
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    match with_scheme.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => with_scheme,
    }
}
