//! Resolve wiki identifiers to API hosts.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::WikinsConfig;
use crate::site::HostResolver;

/// Print the API host of each wiki, or `unresolvable`.
///
/// Uses the built-in host table plus the configured `[hosts]`; never touches the
/// network.
///
/// ```bash
/// $ wikins host enwiki commonswiki foo
/// enwiki       en.wikipedia.org
/// commonswiki  commons.wikimedia.org
/// foo          unresolvable
/// ```
#[derive(Args, Debug)]
pub struct HostCommand {
    /// Wiki identifiers, e.g. enwiki, commonswiki, dewiktionary
    #[arg(required = true)]
    wikis: Vec<String>,
}

impl HostCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config = WikinsConfig::load_with_optional(config_path).await?;
        print!("{}", self.render(&config.host_resolver()));
        Ok(())
    }

    fn render(&self, hosts: &HostResolver) -> String {
        let width = self.wikis.iter().map(String::len).max().unwrap_or(0);
        self.wikis
            .iter()
            .map(|wiki| {
                let host = hosts.resolve_host(wiki).unwrap_or_else(|| "unresolvable".to_string());
                format!("{wiki:<width$}  {host}\n")
            })
            .collect()
    }
}
