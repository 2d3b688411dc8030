//! wikins CLI entry point
//!
//! Parses the command line, runs the selected command and renders failures with
//! suggestions:
//! - `host` - Resolve wiki identifiers to API hosts
//! - `namespaces` - Fetch and print namespace tables
//! - `title` - Prefix a title with its namespace name
//! - `label` - Print a column label
//! - `config` - Manage the configuration file

use anyhow::Result;
use clap::Parser;
use wikins_cli::cli;
use wikins_cli::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
