//! Test utilities for wikins
//!
//! Helpers shared by unit tests and the integration suite (enable the `test-utils`
//! feature to use them outside this crate):
//! - [`init_test_logging`] - Once-guarded tracing setup
//! - [`StubSource`] - in-memory [`NamespaceSource`] that counts fetches and can be made
//!   slow or failing
//! - [`sample_table`] - a small namespace table resembling a Wikimedia wiki
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wikins_cli::cache::NamespaceCache;
//! use wikins_cli::site::HostResolver;
//! use wikins_cli::test_utils::{StubSource, sample_table};
//!
//! # async fn example() {
//! let source = Arc::new(StubSource::new().with_table("en.wikipedia.org", sample_table()));
//! let cache = NamespaceCache::new(source.clone(), HostResolver::default());
//! cache.ensure_loaded(["enwiki"]).await;
//! assert_eq!(source.calls_for("en.wikipedia.org"), 1);
//! # }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::WikinsError;
use crate::namespace::{NamespaceInfo, NamespaceSource, NamespaceTable};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` if given, else `RUST_LOG` if set, else stays silent. Only the first
/// call has an effect.
///
/// ```bash
/// RUST_LOG=cache=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Namespace table with the main, Talk, User, File, Category and Property namespaces.
pub fn sample_table() -> NamespaceTable {
    [
        NamespaceInfo {
            id: 0,
            canonical: None,
            name: String::new(),
            case: Some("first-letter".to_string()),
            content: true,
            subpages: false,
        },
        NamespaceInfo::new(1, "Talk"),
        NamespaceInfo::new(2, "User"),
        NamespaceInfo::new(6, "File"),
        NamespaceInfo::new(14, "Category"),
        NamespaceInfo::new(120, "Property"),
    ]
    .into_iter()
    .collect()
}

/// In-memory namespace source keyed by host.
///
/// Unknown hosts fail with [`WikinsError::FetchFailed`]. Every call is counted, including
/// failed and cancelled ones.
#[derive(Debug, Default)]
pub struct StubSource {
    tables: HashMap<String, NamespaceTable>,
    delay: Duration,
    failures: Mutex<HashMap<String, usize>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubSource {
    /// Empty source that knows no hosts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `table` for `host`.
    #[must_use]
    pub fn with_table(mut self, host: &str, table: NamespaceTable) -> Self {
        self.tables.insert(host.to_string(), table);
        self
    }

    /// Sleep for `delay` before answering each fetch.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the first `times` fetches for `host`, then serve normally.
    #[must_use]
    pub fn failing_first(self, host: &str, times: usize) -> Self {
        self.failures.lock().unwrap().insert(host.to_string(), times);
        self
    }

    /// Number of fetches started for `host`.
    pub fn calls_for(&self, host: &str) -> usize {
        self.calls.lock().unwrap().get(host).copied().unwrap_or(0)
    }

    /// Number of fetches started for any host.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl NamespaceSource for StubSource {
    async fn fetch_namespaces(&self, host: &str) -> Result<NamespaceTable, WikinsError> {
        *self.calls.lock().unwrap().entry(host.to_string()).or_default() += 1;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let should_fail = {
            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(host) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if should_fail {
            return Err(WikinsError::FetchFailed {
                host: host.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        self.tables.get(host).cloned().ok_or_else(|| WikinsError::FetchFailed {
            host: host.to_string(),
            reason: "HTTP 404 Not Found".to_string(),
        })
    }
}
