//! Table columns whose labels and cells depend on wiki namespaces.
//!
//! A list view declares its columns as [`HeaderColumn`]s. Wiki page columns name the
//! wiki (and optionally the namespace) their cells live in, so a view first collects
//! [`HeaderColumn::required_wikis`], passes them to
//! [`NamespaceCache::ensure_loaded`](crate::cache::NamespaceCache::ensure_loaded), and
//! then renders labels and [`WikiPage`] cells synchronously from the cache.
//!
//! # Examples
//!
//! ```rust
//! use wikins_cli::column::{ColumnType, HeaderColumn};
//!
//! let column = HeaderColumn::wiki_page("commonswiki", Some(6));
//! assert_eq!(column.generate_name(), "Commons file");
//! assert_eq!("Location".parse::<ColumnType>().unwrap(), ColumnType::Location);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::cache::NamespaceCache;
use crate::namespace::{MAIN_NAMESPACE, NamespaceId};

/// Labels that replace the generated `<Wiki> NS<id>` form.
const SPECIAL_LABELS: &[(&str, &str)] = &[
    ("Wikidatawiki NS0", "Wikidata item"),
    ("Wikidatawiki NS120", "Wikidata property"),
    ("Commonswiki NS6", "Commons file"),
];

/// Kind of values a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Free text
    String,
    /// A page on a wiki
    WikiPage,
    /// Geographic coordinates
    Location,
}

/// Returned when a string is not one of the [`ColumnType`] names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown column type '{0}', expected String, WikiPage or Location")]
pub struct ParseColumnTypeError(String);

impl FromStr for ColumnType {
    type Err = ParseColumnTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(Self::String),
            "WikiPage" => Ok(Self::WikiPage),
            "Location" => Ok(Self::Location),
            other => Err(ParseColumnTypeError(other.to_string())),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::WikiPage => "WikiPage",
            Self::Location => "Location",
        };
        f.write_str(name)
    }
}

/// One column of a list header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderColumn {
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<NamespaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
}

impl HeaderColumn {
    /// Column of the given type with no wiki, namespace or string attached.
    pub const fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            wiki: None,
            namespace_id: None,
            string: None,
        }
    }

    /// Wiki page column for `wiki`, optionally pinned to a namespace.
    pub fn wiki_page(wiki: impl Into<String>, namespace_id: Option<NamespaceId>) -> Self {
        Self {
            wiki: Some(wiki.into()),
            namespace_id,
            ..Self::new(ColumnType::WikiPage)
        }
    }

    /// Label that needs no namespace data.
    ///
    /// Wiki page columns read `<Wiki> NS<id>` (either part may be missing), except for
    /// the Wikidata item/property and Commons file columns.
    pub fn generate_name(&self) -> String {
        match self.column_type {
            ColumnType::String => "text".to_string(),
            ColumnType::Location => "location".to_string(),
            ColumnType::WikiPage => {
                let mut parts = Vec::new();
                if let Some(wiki) = &self.wiki {
                    parts.push(uc_first(wiki));
                }
                if let Some(namespace_id) = self.namespace_id {
                    parts.push(format!("NS{namespace_id}"));
                }
                let name = parts.join(" ");
                special_label(&name).map_or(name, str::to_string)
            }
        }
    }

    /// Label using namespace names from `cache` where they are loaded.
    ///
    /// A resolved namespace renders as its canonical name (`Enwiki File`) and the main
    /// namespace as the bare wiki (`Enwiki`). Special labels and unresolved namespaces
    /// read as in [`generate_name`](Self::generate_name).
    pub fn generate_label(&self, cache: &NamespaceCache) -> String {
        let name = self.generate_name();
        let is_special = SPECIAL_LABELS.iter().any(|(_, label)| *label == name);
        if self.column_type != ColumnType::WikiPage || is_special {
            return name;
        }

        let (Some(wiki), Some(namespace_id)) = (&self.wiki, self.namespace_id) else {
            return name;
        };
        if namespace_id == MAIN_NAMESPACE {
            return uc_first(wiki);
        }
        cache
            .get(wiki)
            .and_then(|table| {
                table.prefix_name(namespace_id).map(|ns| format!("{} {ns}", uc_first(wiki)))
            })
            .unwrap_or(name)
    }

    /// Wikis whose namespaces are needed to render `columns`, without duplicates.
    pub fn required_wikis<'a, I>(columns: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        columns
            .into_iter()
            .filter(|column| column.column_type == ColumnType::WikiPage)
            .filter_map(|column| column.wiki.clone())
            .filter(|wiki| !wiki.is_empty())
            .collect()
    }
}

/// A wiki page cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPage {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<NamespaceId>,
}

impl WikiPage {
    pub fn new(
        title: impl Into<String>,
        wiki: Option<String>,
        namespace_id: Option<NamespaceId>,
    ) -> Self {
        Self {
            title: title.into(),
            wiki,
            namespace_id,
        }
    }

    /// Page with wiki and namespace taken from its column.
    pub fn in_column(title: impl Into<String>, column: &HeaderColumn) -> Self {
        Self::new(title, column.wiki.clone(), column.namespace_id)
    }

    /// Title with its namespace prefix, e.g. `File:Foo.png`.
    ///
    /// Falls back to the bare title when the wiki or namespace is unknown or not loaded.
    pub fn display_title(&self, cache: &NamespaceCache) -> String {
        match (&self.wiki, self.namespace_id) {
            (Some(wiki), Some(namespace_id)) => {
                cache.prefix_with_namespace(wiki, namespace_id, &self.title)
            }
            _ => self.title.clone(),
        }
    }
}

fn special_label(name: &str) -> Option<&'static str> {
    SPECIAL_LABELS
        .iter()
        .find(|(generated, _)| *generated == name)
        .map(|(_, label)| *label)
}

fn uc_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
