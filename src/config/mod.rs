//! Configuration management for wikins
//!
//! wikins reads a single optional TOML file, by default `~/.wikins/config.toml`
//! (`%LOCALAPPDATA%\wikins\config.toml` on Windows). A missing file means defaults.
//! The `--config` flag of the CLI selects another file.
//!
//! ```toml
//! api_scheme = "https"
//! api_path = "/w/api.php"
//!
//! # Whole fetch budget, split evenly over the first attempt and each retry
//! fetch_timeout_secs = 30
//! max_retries = 2
//!
//! # Re-fetch namespace tables older than this; omit to keep them for the session
//! cache_ttl_secs = 3600
//!
//! # Extra or replacement host mappings, consulted before the suffix rules
//! [hosts]
//! testwiki = "test.wikipedia.org"
//! ```
//!
//! # Modules
//!
//! - `global` - [`WikinsConfig`] loading, saving and validation

mod global;

pub use global::WikinsConfig;
