//! Command-line interface for wikins.
//!
//! Each command lives in its own module with an argument struct and an `execute`
//! method. Commands that need namespace data build a [`NamespaceCache`] from the
//! configuration, call `ensure_loaded` once for every wiki they touch, and then render
//! synchronously from the cache.
//!
//! # Available Commands
//!
//! - `host` - Resolve wiki identifiers to API hosts (no network)
//! - `namespaces` - Fetch and print namespace tables
//! - `title` - Prefix a title with its namespace name
//! - `label` - Print the label of a list column
//! - `config` - Manage the configuration file
//!
//! # Usage
//!
//! ```bash
//! wikins host enwiki commonswiki dewiktionary
//! wikins namespaces commonswiki --json
//! wikins title commonswiki 6 Foo.png          # File:Foo.png
//! wikins label --type WikiPage --wiki enwiki --namespace 14
//! wikins --config ./wikins.toml config show
//! ```
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`. `--verbose` enables debug output,
//! `--quiet` limits it to errors; `RUST_LOG` takes precedence over both.

mod config;
mod host;
mod label;
mod namespaces;
mod title;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::cache::{LoadOutcome, LoadReport, NamespaceCache};
use crate::config::WikinsConfig;
use crate::core::WikinsError;

pub use config::ConfigCommand;
pub use host::HostCommand;
pub use label::LabelCommand;
pub use namespaces::NamespacesCommand;
pub use title::TitleCommand;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default log filter, used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Configuration file to use instead of the default location.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global `tracing` subscriber writing to stderr.
    ///
    /// Only the first installation in a process takes effect.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.as_str()));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Namespace tools for Wikimedia wikis.
#[derive(Parser, Debug)]
#[command(
    name = "wikins",
    about = "Resolve wiki hosts and namespace-prefixed titles",
    version,
    long_about = "wikins maps Wikimedia wiki identifiers to API hosts, fetches their \
                  namespace tables, and formats namespaced titles and column labels."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output (fetches, cache hits and misses)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file (default: ~/.wikins/config.toml)
    #[arg(short, long, global = true, env = "WIKINS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve wiki identifiers to API hosts
    Host(HostCommand),

    /// Fetch and print the namespace tables of wikis
    Namespaces(NamespacesCommand),

    /// Prefix a page title with its namespace name
    Title(TitleCommand),

    /// Print the label of a list column
    Label(LabelCommand),

    /// Manage the configuration file
    Config(ConfigCommand),
}

impl Cli {
    /// Set up logging and run the selected command.
    ///
    /// # Errors
    ///
    /// Returns the command's error; the binary renders it with
    /// [`user_friendly_error`](crate::core::user_friendly_error).
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command with an explicit configuration, without touching
    /// the global logger.
    ///
    /// # Errors
    ///
    /// Returns the command's error.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let config_path = config.config_path;
        match self.command {
            Commands::Host(cmd) => cmd.execute(config_path).await,
            Commands::Namespaces(cmd) => cmd.execute(config_path).await,
            Commands::Title(cmd) => cmd.execute(config_path).await,
            Commands::Label(cmd) => cmd.execute(config_path).await,
            Commands::Config(cmd) => cmd.execute(config_path).await,
        }
    }
}

/// Load the configuration and build a cache backed by the HTTP client.
async fn load_cache(config_path: Option<PathBuf>) -> Result<NamespaceCache> {
    let config = WikinsConfig::load_with_optional(config_path).await?;
    NamespaceCache::from_config(&config)
}

/// Turn the first wiki that did not load into an error.
fn require_loaded(report: &LoadReport) -> Result<()> {
    let Some((wiki, outcome)) = report.missing().next() else {
        return Ok(());
    };

    let error = match outcome {
        LoadOutcome::Failed(e) => e.clone(),
        LoadOutcome::Unresolvable => WikinsError::UnresolvableWiki {
            wiki: wiki.to_string(),
        },
        _ => {
            return Err(anyhow::anyhow!(
                "Namespaces of {wiki} were being fetched elsewhere and did not arrive"
            ));
        }
    };
    Err(anyhow::Error::new(error).context(format!("Could not load namespaces of {wiki}")))
}
