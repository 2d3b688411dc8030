//! Prefix a page title with its namespace name.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::load_cache;
use crate::cache::NamespaceCache;
use crate::namespace::NamespaceId;

/// Print `<Namespace>:<title>` for a page on a wiki.
///
/// Falls back to the bare title when the wiki's namespaces cannot be loaded or the
/// namespace does not exist; `--strict` turns that into an error.
///
/// ```bash
/// $ wikins title commonswiki 6 Foo.png
/// File:Foo.png
/// ```
#[derive(Args, Debug)]
pub struct TitleCommand {
    /// Wiki identifier
    wiki: String,

    /// Namespace ID (0 is the main namespace)
    #[arg(allow_negative_numbers = true)]
    namespace: NamespaceId,

    /// Page title without namespace prefix
    title: String,

    /// Fail instead of printing the bare title when the namespace is unknown
    #[arg(long)]
    strict: bool,
}

impl TitleCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let cache = load_cache(config_path).await?;
        println!("{}", self.render(&cache).await?);
        Ok(())
    }

    async fn render(&self, cache: &NamespaceCache) -> Result<String> {
        cache.ensure_loaded([&self.wiki]).await;

        if self.strict {
            Ok(cache.try_prefix_with_namespace(&self.wiki, self.namespace, &self.title)?)
        } else {
            Ok(cache.prefix_with_namespace(&self.wiki, self.namespace, &self.title))
        }
    }
}
