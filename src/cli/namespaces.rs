//! Fetch and print namespace tables.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{load_cache, require_loaded};
use crate::cache::NamespaceCache;
use crate::namespace::NamespaceInfo;

/// Load the namespace tables of one or more wikis and print them.
///
/// All wikis are fetched concurrently. Tables that loaded are printed even when
/// others failed; the command then exits with the first failure.
#[derive(Args, Debug)]
pub struct NamespacesCommand {
    /// Wiki identifiers
    #[arg(required = true)]
    wikis: Vec<String>,

    /// Print the tables as JSON keyed by wiki
    #[arg(long)]
    json: bool,
}

impl NamespacesCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let cache = load_cache(config_path).await?;
        self.execute_with_cache(&cache).await
    }

    async fn execute_with_cache(&self, cache: &NamespaceCache) -> Result<()> {
        let report = cache.ensure_loaded(&self.wikis).await;

        if self.json {
            println!("{}", self.render_json(cache)?);
        } else {
            for wiki in report.iter().filter(|(_, o)| o.is_loaded()).map(|(wiki, _)| wiki) {
                let host = cache.hosts().resolve_host(wiki).unwrap_or_default();
                println!("{} ({host})", wiki.bold());
                print!("{}", self.render_table(cache, wiki));
            }
        }

        require_loaded(&report)
    }

    fn render_table(&self, cache: &NamespaceCache, wiki: &str) -> String {
        let Some(table) = cache.get(wiki) else {
            return String::new();
        };
        table
            .iter()
            .map(|ns| {
                let name = ns.prefix_name().unwrap_or("(main)");
                let mut line = format!("{:>6}  {name}", ns.id);
                if ns.canonical.as_deref().is_some_and(|c| c != ns.name && !ns.name.is_empty()) {
                    line.push_str(&format!(" [{}]", ns.name));
                }
                if ns.content {
                    line.push_str(" (content)");
                }
                line.push('\n');
                line
            })
            .collect()
    }

    fn render_json(&self, cache: &NamespaceCache) -> Result<String> {
        let tables: BTreeMap<&str, Vec<NamespaceInfo>> = self
            .wikis
            .iter()
            .filter_map(|wiki| {
                cache.get(wiki).map(|table| (wiki.as_str(), table.iter().cloned().collect()))
            })
            .collect();
        serde_json::to_string_pretty(&tables).context("Failed to serialize namespace tables")
    }
}
