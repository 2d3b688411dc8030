//! Manage the wikins configuration file.
//!
//! ```bash
//! wikins config init            # write an example config
//! wikins config init --force    # overwrite an existing one
//! wikins config show            # print the effective configuration
//! wikins config path            # print where the config lives
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::WikinsConfig;

/// Manage the configuration file. Shows the configuration when no subcommand is given.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Write an example configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

impl ConfigCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(force, config_path).await,
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
            Some(ConfigSubcommands::Path) => Self::show_path(config_path),
        }
    }

    fn resolve_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(path),
            None => WikinsConfig::default_path(),
        }
    }

    async fn init(force: bool, config_path: Option<PathBuf>) -> Result<()> {
        let config_path = Self::resolve_path(config_path)?;

        if config_path.exists() && !force {
            println!("❌ Config already exists at: {}", config_path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        let config = WikinsConfig::init_example();
        config.save_to(&config_path).await?;

        println!("✅ Created config at: {}", config_path.display());
        println!("\n{}", "Example configuration:".bold());
        println!("{}", toml::to_string_pretty(&config)?);
        println!("\n{}", "Next steps:".yellow());
        println!("  1. Add [hosts] entries for wikis outside the Wikimedia naming scheme");
        println!("  2. Remove cache_ttl_secs to keep namespace tables for the whole session");

        Ok(())
    }

    async fn show(config_path: Option<PathBuf>) -> Result<()> {
        let config = WikinsConfig::load_with_optional(config_path.clone()).await?;
        let config_path = Self::resolve_path(config_path)?;

        println!("{}", "Configuration".bold());
        if config_path.exists() {
            println!("Location: {}\n", config_path.display());
        } else {
            println!("Location: {} (not found, using defaults)\n", config_path.display());
        }
        println!("{}", toml::to_string_pretty(&config)?);

        if config.hosts.is_empty() {
            println!("{}", "Tip:".yellow());
            println!("  Run 'wikins config init' to create an example configuration");
        }

        Ok(())
    }

    fn show_path(config_path: Option<PathBuf>) -> Result<()> {
        let config_path = Self::resolve_path(config_path)?;
        println!("{}", config_path.display());
        Ok(())
    }
}
