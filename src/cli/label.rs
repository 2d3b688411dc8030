//! Print the label of a list column.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::load_cache;
use crate::cache::NamespaceCache;
use crate::column::{ColumnType, HeaderColumn};
use crate::namespace::NamespaceId;

/// Print the label a list view shows for a column.
///
/// Wiki page columns load the wiki's namespaces first so the label can use the
/// namespace name; without `--wiki` nothing is fetched.
///
/// ```bash
/// $ wikins label --type WikiPage --wiki enwiki --namespace 14
/// Enwiki Category
/// $ wikins label --type WikiPage --wiki commonswiki --namespace 6
/// Commons file
/// ```
#[derive(Args, Debug)]
pub struct LabelCommand {
    /// Column type: String, WikiPage or Location
    #[arg(long = "type", value_name = "TYPE")]
    column_type: ColumnType,

    /// Wiki of a WikiPage column
    #[arg(long)]
    wiki: Option<String>,

    /// Namespace of a WikiPage column
    #[arg(long, allow_negative_numbers = true)]
    namespace: Option<NamespaceId>,
}

impl LabelCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let cache = load_cache(config_path).await?;
        println!("{}", self.render(&cache).await);
        Ok(())
    }

    fn column(&self) -> HeaderColumn {
        HeaderColumn {
            wiki: self.wiki.clone(),
            namespace_id: self.namespace,
            ..HeaderColumn::new(self.column_type)
        }
    }

    async fn render(&self, cache: &NamespaceCache) -> String {
        let column = self.column();
        let wikis = HeaderColumn::required_wikis([&column]);
        if !wikis.is_empty() {
            cache.ensure_loaded(wikis).await;
        }
        column.generate_label(cache)
    }
}
