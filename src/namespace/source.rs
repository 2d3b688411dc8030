//! Where namespace tables come from.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;

use super::NamespaceTable;
use crate::config::WikinsConfig;
use crate::constants::{MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use crate::core::WikinsError;

/// Fetches the namespace table of a host.
///
/// The cache calls this at most once per wiki at a time. Implementations report every
/// failure as a [`WikinsError`]; the cache decides what a failure means for waiters.
#[async_trait]
pub trait NamespaceSource: Send + Sync {
    /// Fetch and parse the namespace table served by `host`.
    async fn fetch_namespaces(&self, host: &str) -> Result<NamespaceTable, WikinsError>;
}

/// HTTP source querying the MediaWiki `siteinfo` API module.
#[derive(Debug, Clone)]
pub struct SiteInfoClient {
    client: reqwest::Client,
    api_scheme: String,
    api_path: String,
    max_retries: usize,
}

impl SiteInfoClient {
    /// Build a client from the configuration (User-Agent, endpoint, timeouts, retries).
    ///
    /// Each request gets [`WikinsConfig::request_timeout`], so a stalled attempt can
    /// still be retried within the fetch timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn from_config(config: &WikinsConfig) -> Result<Self> {
        let client = Self::client_builder(config).build().context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, config))
    }

    fn client_builder(config: &WikinsConfig) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
    }

    fn with_client(client: reqwest::Client, config: &WikinsConfig) -> Self {
        Self {
            client,
            api_scheme: config.api_scheme.clone(),
            api_path: config.api_path.clone(),
            max_retries: config.max_retries,
        }
    }

    /// The endpoint queried for `host`, without query parameters.
    pub fn endpoint_url(&self, host: &str) -> String {
        format!("{}://{host}{}", self.api_scheme, self.api_path)
    }

    async fn fetch_once(&self, host: &str) -> Result<NamespaceTable, WikinsError> {
        let failed = |reason: String| WikinsError::FetchFailed {
            host: host.to_string(),
            reason,
        };

        let response = self
            .client
            .get(self.endpoint_url(host))
            .query(&[
                ("action", "query"),
                ("meta", "siteinfo"),
                ("siprop", "namespaces"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| failed(e.to_string()))?;
        NamespaceTable::from_siteinfo(host, &body)
    }
}

#[async_trait]
impl NamespaceSource for SiteInfoClient {
    async fn fetch_namespaces(&self, host: &str) -> Result<NamespaceTable, WikinsError> {
        let strategy = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
            .take(self.max_retries);

        RetryIf::start(
            strategy,
            || async {
                self.fetch_once(host).await.inspect_err(|e| {
                    tracing::debug!(target: "fetch", "Attempt against {host} failed: {e}");
                })
            },
            WikinsError::is_transient,
        )
        .await
    }
}
