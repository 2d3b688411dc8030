//! wikins - namespace resolver cache for Wikimedia wikis
//!
//! List views that show pages from many wikis need each wiki's namespace names
//! (`File`, `Category`, `Property`, ...) to render titles like `File:Foo.png`. wikins
//! keeps those tables in a session-scoped cache, fetches each wiki's table at most once
//! however many views ask for it concurrently, and answers title lookups synchronously.
//!
//! # Architecture Overview
//!
//! ```text
//! wiki ids ──► site::HostResolver ──► namespace::NamespaceSource ──► cache::NamespaceCache
//!                "enwiki" →              siteinfo API (reqwest)          ensure_loaded()
//!                en.wikipedia.org                                        prefix_with_namespace()
//! ```
//!
//! # Modules
//!
//! - [`site`] - Wiki identifier → API host rules
//! - [`namespace`] - Namespace tables, siteinfo parsing and the HTTP source
//! - [`cache`] - The de-duplicating namespace cache
//! - [`column`] - Column labels and wiki page cells rendered from the cache
//! - [`config`] - Configuration file (`~/.wikins/config.toml`)
//! - [`core`] - Error types and user-facing error rendering
//! - [`cli`] - The `wikins` command-line interface
//! - [`constants`] - Timeouts and retry parameters
//!
//! # Example
//!
//! ```rust,no_run
//! use wikins_cli::cache::NamespaceCache;
//! use wikins_cli::column::{HeaderColumn, WikiPage};
//! use wikins_cli::config::WikinsConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = WikinsConfig::load().await?;
//! let cache = NamespaceCache::from_config(&config)?;
//!
//! let columns = vec![HeaderColumn::wiki_page("commonswiki", Some(6))];
//! cache.ensure_loaded(HeaderColumn::required_wikis(&columns)).await;
//!
//! let page = WikiPage::in_column("Foo.png", &columns[0]);
//! assert_eq!(page.display_title(&cache), "File:Foo.png");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod column;
pub mod config;
pub mod constants;
pub mod core;
pub mod namespace;
pub mod site;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
