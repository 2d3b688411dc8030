//! The wikins configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{
    DEFAULT_API_PATH, DEFAULT_API_SCHEME, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_RETRIES,
    DEFAULT_USER_AGENT,
};
use crate::core::WikinsError;
use crate::site::HostResolver;

/// User configuration for host resolution and namespace fetching.
///
/// Every field has a default, so an empty file (or no file) is a valid configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use wikins_cli::config::WikinsConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = WikinsConfig::load_with_optional(None).await?;
/// let hosts = config.host_resolver();
/// assert_eq!(hosts.resolve_host("enwiki").as_deref(), Some("en.wikipedia.org"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikinsConfig {
    /// URL scheme used to reach each host, `https` or `http`.
    pub api_scheme: String,

    /// Path of the action API on each host.
    pub api_path: String,

    /// User-Agent header for API requests.
    pub user_agent: String,

    /// Upper bound for one namespace fetch, retries included.
    pub fetch_timeout_secs: u64,

    /// Retries after a transient fetch failure.
    pub max_retries: usize,

    /// Age after which a cached namespace table is re-fetched.
    ///
    /// `None` keeps tables for the lifetime of the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,

    /// Identifier → host mappings that extend or replace the built-in table.
    ///
    /// Kept last so it serializes after the plain keys.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub hosts: BTreeMap<String, String>,
}

impl Default for WikinsConfig {
    fn default() -> Self {
        Self {
            api_scheme: DEFAULT_API_SCHEME.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            max_retries: DEFAULT_MAX_RETRIES,
            cache_ttl_secs: None,
            hosts: BTreeMap::new(),
        }
    }
}

impl WikinsConfig {
    /// Load from the default location, or defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the default path cannot be determined, or the file exists
    /// but cannot be read, parsed or validated.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, else from the default location.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or fails
    /// [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate().map_err(|reason| WikinsError::ConfigError {
            path: path.display().to_string(),
            reason,
        })?;

        Ok(config)
    }

    /// Save as pretty TOML, creating parent directories.
    ///
    /// On Unix the file is restricted to the owner (`0600`).
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).await.with_context(|| {
                format!("Failed to set permissions on {}", path.display())
            })?;
        }

        Ok(())
    }

    /// Platform default path of the configuration file.
    ///
    /// - **Windows**: `%LOCALAPPDATA%\wikins\config.toml`
    /// - **Unix/macOS**: `~/.wikins/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("wikins")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".wikins")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Check value ranges. Returns the reason on failure.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be greater than zero".to_string());
        }
        if !matches!(self.api_scheme.as_str(), "https" | "http") {
            return Err(format!("api_scheme must be 'https' or 'http', got '{}'", self.api_scheme));
        }
        if !self.api_path.starts_with('/') {
            return Err(format!("api_path must start with '/', got '{}'", self.api_path));
        }
        if self.cache_ttl_secs == Some(0) {
            return Err("cache_ttl_secs must be greater than zero when set".to_string());
        }
        if let Some((wiki, _)) = self.hosts.iter().find(|(_, host)| host.trim().is_empty()) {
            return Err(format!("host for '{wiki}' is empty"));
        }
        Ok(())
    }

    /// Per-fetch timeout.
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Timeout of a single HTTP request.
    ///
    /// The fetch budget is shared by the first attempt and every retry, so a request
    /// that times out still leaves room for the next one.
    pub fn request_timeout(&self) -> Duration {
        let attempts = u32::try_from(self.max_retries.saturating_add(1)).unwrap_or(u32::MAX);
        self.fetch_timeout() / attempts
    }

    /// Cache entry lifetime, if configured.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Host resolver with the built-in table plus the configured `[hosts]`.
    pub fn host_resolver(&self) -> HostResolver {
        HostResolver::with_overrides(self.hosts.clone())
    }

    /// Example configuration written by `wikins config init`.
    #[must_use]
    pub fn init_example() -> Self {
        let mut hosts = BTreeMap::new();
        hosts.insert("testwiki".to_string(), "test.wikipedia.org".to_string());
        hosts.insert("test2wiki".to_string(), "test2.wikipedia.org".to_string());

        Self {
            hosts,
            cache_ttl_secs: Some(24 * 60 * 60),
            ..Self::default()
        }
    }
}
