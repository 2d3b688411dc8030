//! Namespace resolver cache with per-wiki fetch de-duplication
//!
//! [`NamespaceCache`] owns the namespace tables of every wiki a session has asked for.
//! Callers declare the wikis a view needs with [`NamespaceCache::ensure_loaded`] and
//! afterwards format titles synchronously with
//! [`NamespaceCache::prefix_with_namespace`], which never touches the network.
//!
//! # Concurrency Architecture
//!
//! Each wiki has at most one entry in a `DashMap`, in one of two states:
//! - **Pending(notify)**: exactly one caller is fetching the table
//! - **Ready(table)**: the table is cached
//!
//! A wiki can therefore never be both in flight and resolved, and at most one fetch
//! per wiki is outstanding however many callers ask for it:
//!
//! ```text
//! Caller A: ensure_loaded(["enwiki"]) ── Vacant → Pending(n) ── fetch ── Ready ── notify(n)
//!                                                                           │
//! Caller B: ensure_loaded(["enwiki"]) ────────── sees Pending(n) ── waits ◄─┘
//! ```
//!
//! Waiters subscribe to the `tokio::sync::Notify` of the pending entry before they
//! release the map entry, so a fetch that completes in between cannot be missed.
//! The fetching caller clears its `Pending` marker on every outcome: success,
//! failure, timeout, and cancellation of its future (through a drop guard).
//!
//! # Failure Model
//!
//! A failed fetch leaves the wiki unresolved and wakes its waiters; it never aborts
//! the other wikis of the batch. The next `ensure_loaded` for that wiki fetches again.
//! Lookups against unresolved wikis fall back to the bare title.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wikins_cli::cache::NamespaceCache;
//! use wikins_cli::config::WikinsConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cache = NamespaceCache::from_config(&WikinsConfig::default())?;
//!
//! cache.ensure_loaded(["commonswiki", "enwiki"]).await;
//! assert_eq!(cache.prefix_with_namespace("commonswiki", 6, "Foo.png"), "File:Foo.png");
//! assert_eq!(cache.prefix_with_namespace("enwiki", 0, "Foo"), "Foo");
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

use crate::config::WikinsConfig;
use crate::constants::{DEFAULT_FETCH_TIMEOUT, pending_state_timeout};
use crate::core::WikinsError;
use crate::namespace::{
    MAIN_NAMESPACE, NamespaceId, NamespaceSource, NamespaceTable, SiteInfoClient,
};
use crate::site::HostResolver;

#[cfg(test)]
mod tests;

/// State of one wiki in the cache.
#[derive(Debug, Clone)]
enum EntryState {
    /// A fetch is in flight. Waiters are woken through the handle when it settles.
    Pending(Arc<Notify>),

    /// The namespace table is cached.
    Ready {
        table: Arc<NamespaceTable>,
        fetched_at: Instant,
    },
}

/// What [`NamespaceCache::ensure_loaded`] did for one wiki.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The table was already cached; nothing was fetched.
    Cached,
    /// This call fetched the table.
    Fetched,
    /// Another caller's in-flight fetch produced the table.
    Awaited,
    /// No host could be determined for the identifier; the wiki was skipped.
    Unresolvable,
    /// This call's fetch failed.
    Failed(WikinsError),
    /// Another caller's in-flight fetch failed or did not settle in time.
    Unavailable,
}

impl LoadOutcome {
    /// Whether the wiki's table is in the cache after this outcome.
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Cached | Self::Fetched | Self::Awaited)
    }
}

/// Per-wiki outcomes of one [`NamespaceCache::ensure_loaded`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    outcomes: BTreeMap<String, LoadOutcome>,
}

impl LoadReport {
    /// Outcome for `wiki`, if it was part of the request.
    pub fn outcome(&self, wiki: &str) -> Option<&LoadOutcome> {
        self.outcomes.get(wiki)
    }

    /// All outcomes in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LoadOutcome)> {
        self.outcomes.iter().map(|(wiki, outcome)| (wiki.as_str(), outcome))
    }

    /// Number of fetches issued by this call.
    pub fn fetch_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| matches!(o, LoadOutcome::Fetched | LoadOutcome::Failed(_)))
            .count()
    }

    /// Whether every requested wiki ended up in the cache.
    pub fn all_loaded(&self) -> bool {
        self.outcomes.values().all(LoadOutcome::is_loaded)
    }

    /// Wikis that are not in the cache after this call.
    pub fn missing(&self) -> impl Iterator<Item = (&str, &LoadOutcome)> {
        self.iter().filter(|(_, outcome)| !outcome.is_loaded())
    }

    /// Number of distinct wikis requested.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the request was empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl FromIterator<(String, LoadOutcome)> for LoadReport {
    fn from_iter<I: IntoIterator<Item = (String, LoadOutcome)>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

/// Clears a wiki's `Pending` marker and wakes its waiters when dropped.
///
/// Only the marker this guard installed is removed; a `Ready` entry stored through
/// [`PendingGuard::resolve`] stays.
struct PendingGuard<'a> {
    entries: &'a DashMap<String, EntryState>,
    wiki: &'a str,
    notify: Arc<Notify>,
}

impl PendingGuard<'_> {
    fn owns(&self, state: &EntryState) -> bool {
        matches!(state, EntryState::Pending(n) if Arc::ptr_eq(n, &self.notify))
    }

    fn resolve(self, table: NamespaceTable) {
        if let Some(mut state) = self.entries.get_mut(self.wiki) {
            if self.owns(&state) {
                *state = EntryState::Ready {
                    table: Arc::new(table),
                    fetched_at: Instant::now(),
                };
            }
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.entries.remove_if(self.wiki, |_, state| self.owns(state));
        self.notify.notify_waiters();
    }
}

enum Slot {
    Fresh,
    Stale,
    InFlight(Arc<Notify>),
}

/// Session-scoped cache of wiki namespace tables.
///
/// Cloning is cheap and clones share the same entries, so one cache can be handed to
/// many tasks.
#[derive(Clone)]
pub struct NamespaceCache {
    entries: Arc<DashMap<String, EntryState>>,
    source: Arc<dyn NamespaceSource>,
    hosts: Arc<HostResolver>,
    fetch_timeout: Duration,
    ttl: Option<Duration>,
}

impl fmt::Debug for NamespaceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceCache")
            .field("entries", &self.entries.len())
            .field("fetch_timeout", &self.fetch_timeout)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl NamespaceCache {
    /// Create an empty cache fetching through `source`.
    pub fn new(source: Arc<dyn NamespaceSource>, hosts: HostResolver) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            source,
            hosts: Arc::new(hosts),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            ttl: None,
        }
    }

    /// Create an empty cache backed by the HTTP siteinfo client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &WikinsConfig) -> Result<Self> {
        let source = SiteInfoClient::from_config(config)?;
        Ok(Self::new(Arc::new(source), config.host_resolver())
            .with_fetch_timeout(config.fetch_timeout())
            .with_ttl(config.cache_ttl()))
    }

    /// Bound each fetch by `timeout`.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Expire cached tables after `ttl`; `None` keeps them for the cache's lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// The host resolver used for missing wikis.
    pub fn hosts(&self) -> &HostResolver {
        &self.hosts
    }

    fn is_expired(&self, fetched_at: Instant) -> bool {
        self.ttl.is_some_and(|ttl| fetched_at.elapsed() >= ttl)
    }

    /// Make sure the namespace tables of `wikis` are cached.
    ///
    /// Duplicates collapse. Wikis already cached cost nothing; wikis being fetched by
    /// another caller are awaited instead of fetched again; the rest are fetched
    /// concurrently. Completes once every wiki has settled.
    ///
    /// Never fails: unresolvable identifiers and failed fetches are reported in the
    /// returned [`LoadReport`] and logged, and leave the wiki unresolved.
    pub async fn ensure_loaded<I, S>(&self, wikis: I) -> LoadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wikis: BTreeSet<String> =
            wikis.into_iter().map(|wiki| wiki.as_ref().to_string()).collect();

        let outcomes = join_all(wikis.iter().map(|wiki| self.ensure_one(wiki))).await;

        let report: LoadReport = wikis.into_iter().zip(outcomes).collect();
        if report.fetch_count() > 0 {
            tracing::debug!(
                target: "cache",
                "Loaded namespaces: {} requested, {} fetched, {} missing",
                report.len(),
                report.fetch_count(),
                report.missing().count()
            );
        }
        report
    }

    async fn ensure_one(&self, wiki: &str) -> LoadOutcome {
        let notify = Arc::new(Notify::new());

        let host = match self.entries.entry(wiki.to_string()) {
            Entry::Occupied(mut entry) => {
                let slot = match entry.get() {
                    EntryState::Ready { fetched_at, .. } if !self.is_expired(*fetched_at) => {
                        Slot::Fresh
                    }
                    EntryState::Ready { .. } => Slot::Stale,
                    EntryState::Pending(existing) => Slot::InFlight(Arc::clone(existing)),
                };
                match slot {
                    Slot::Fresh => return LoadOutcome::Cached,
                    Slot::InFlight(existing) => {
                        // Subscribe before releasing the entry so the wake-up cannot be missed
                        let notified = existing.notified();
                        drop(entry);
                        tracing::debug!(target: "cache", "Waiting for in-flight fetch of {wiki}");

                        let wait = pending_state_timeout(self.fetch_timeout);
                        if tokio::time::timeout(wait, notified).await.is_err() {
                            tracing::warn!(
                                target: "cache",
                                "Timed out waiting for in-flight fetch of {wiki}"
                            );
                            return LoadOutcome::Unavailable;
                        }
                        return if self.is_loaded(wiki) {
                            LoadOutcome::Awaited
                        } else {
                            LoadOutcome::Unavailable
                        };
                    }
                    Slot::Stale => {}
                }
                let Some(host) = self.hosts.resolve_host(wiki) else {
                    entry.remove();
                    return LoadOutcome::Unresolvable;
                };
                tracing::debug!(target: "cache", "Namespaces of {wiki} expired, re-fetching");
                entry.insert(EntryState::Pending(Arc::clone(&notify)));
                host
            }
            Entry::Vacant(entry) => {
                let Some(host) = self.hosts.resolve_host(wiki) else {
                    tracing::debug!(target: "cache", "Skipping {wiki:?}: no host can be determined");
                    return LoadOutcome::Unresolvable;
                };
                entry.insert(EntryState::Pending(Arc::clone(&notify)));
                host
            }
        };

        let guard = PendingGuard {
            entries: &self.entries,
            wiki,
            notify,
        };

        tracing::debug!(target: "cache", "Fetching namespaces of {wiki} from {host}");
        let result = tokio::time::timeout(self.fetch_timeout, self.source.fetch_namespaces(&host))
            .await
            .unwrap_or_else(|_| {
                Err(WikinsError::FetchTimeout {
                    host: host.clone(),
                    seconds: self.fetch_timeout.as_secs(),
                })
            });

        match result {
            Ok(table) => {
                tracing::debug!(
                    target: "cache",
                    "Cached {} namespaces of {wiki}",
                    table.len()
                );
                guard.resolve(table);
                LoadOutcome::Fetched
            }
            Err(e) => {
                tracing::warn!(target: "cache", "Could not load namespaces of {wiki}: {e}");
                drop(guard);
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Cached namespace table of `wiki`, ignoring expired entries.
    pub fn get(&self, wiki: &str) -> Option<Arc<NamespaceTable>> {
        match self.entries.get(wiki).as_deref() {
            Some(EntryState::Ready { table, fetched_at }) if !self.is_expired(*fetched_at) => {
                Some(Arc::clone(table))
            }
            _ => None,
        }
    }

    /// Whether `wiki`'s table is cached and not expired.
    pub fn is_loaded(&self, wiki: &str) -> bool {
        self.get(wiki).is_some()
    }

    /// Whether a fetch for `wiki` is in flight.
    pub fn is_pending(&self, wiki: &str) -> bool {
        matches!(self.entries.get(wiki).as_deref(), Some(EntryState::Pending(_)))
    }

    /// Prefix `title` with the canonical name of namespace `namespace_id`.
    ///
    /// Cache-only and synchronous. The main namespace returns `title` unchanged. When
    /// the wiki or namespace is not cached the bare title is returned and the miss is
    /// logged at debug level; use [`try_prefix_with_namespace`](Self::try_prefix_with_namespace)
    /// to detect misses.
    pub fn prefix_with_namespace(
        &self,
        wiki: &str,
        namespace_id: NamespaceId,
        title: &str,
    ) -> String {
        self.try_prefix_with_namespace(wiki, namespace_id, title).unwrap_or_else(|e| {
            tracing::debug!(target: "cache", "{e}; using bare title");
            title.to_string()
        })
    }

    /// Strict variant of [`prefix_with_namespace`](Self::prefix_with_namespace).
    ///
    /// # Errors
    ///
    /// Returns [`WikinsError::NamespaceLookupFailed`] when `namespace_id` is not the
    /// main namespace and the wiki or the namespace is not cached.
    pub fn try_prefix_with_namespace(
        &self,
        wiki: &str,
        namespace_id: NamespaceId,
        title: &str,
    ) -> Result<String, WikinsError> {
        if namespace_id == MAIN_NAMESPACE {
            return Ok(title.to_string());
        }

        self.get(wiki)
            .and_then(|table| {
                table.prefix_name(namespace_id).map(|prefix| format!("{prefix}:{title}"))
            })
            .ok_or_else(|| WikinsError::NamespaceLookupFailed {
                wiki: wiki.to_string(),
                namespace_id,
            })
    }

    /// Drop the cached table of `wiki` so the next `ensure_loaded` fetches it again.
    ///
    /// In-flight fetches are left alone. Returns whether a table was dropped.
    pub fn invalidate(&self, wiki: &str) -> bool {
        self.entries
            .remove_if(wiki, |_, state| matches!(state, EntryState::Ready { .. }))
            .is_some()
    }

    /// Drop every cached table. In-flight fetches are left alone.
    pub fn clear(&self) {
        self.entries.retain(|_, state| matches!(state, EntryState::Pending(_)));
    }

    /// Wikis with a cached, unexpired table, in identifier order.
    pub fn loaded_wikis(&self) -> Vec<String> {
        let mut wikis: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| match entry.value() {
                EntryState::Ready { fetched_at, .. } => !self.is_expired(*fetched_at),
                EntryState::Pending(_) => false,
            })
            .map(|entry| entry.key().clone())
            .collect();
        wikis.sort();
        wikis
    }

    /// Number of cached, unexpired tables.
    pub fn len(&self) -> usize {
        self.loaded_wikis().len()
    }

    /// Whether no table is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
