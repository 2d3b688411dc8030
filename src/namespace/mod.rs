//! Namespace tables of MediaWiki sites.
//!
//! A [`NamespaceTable`] maps namespace IDs to their metadata and is built once per
//! wiki from the `siteinfo` API module:
//!
//! ```text
//! GET https://<host>/w/api.php?action=query&meta=siteinfo&siprop=namespaces&format=json
//! ```
//!
//! Both response format versions are accepted. Format version 1 marks flags with an
//! empty string and names the local namespace name `*`; format version 2 uses booleans
//! and `name`.
//!
//! Tables are fetched through the [`NamespaceSource`] trait; [`SiteInfoClient`] is the
//! HTTP implementation.

mod source;

pub use source::{NamespaceSource, SiteInfoClient};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::core::WikinsError;

/// Namespace identifier. `0` is the main namespace; `-1`/`-2` are Special/Media.
pub type NamespaceId = i64;

/// The main (article) namespace.
pub const MAIN_NAMESPACE: NamespaceId = 0;

/// Metadata of a single namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    /// Namespace ID
    pub id: NamespaceId,
    /// Canonical (English) name, e.g. `File`. Absent for the main namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    /// Name in the wiki's content language, e.g. `Datei` on dewiki
    pub name: String,
    /// Capitalisation rule, usually `first-letter`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    /// Whether pages in this namespace count as content
    #[serde(default)]
    pub content: bool,
    /// Whether subpages are enabled
    #[serde(default)]
    pub subpages: bool,
}

impl NamespaceInfo {
    /// Create an entry with just an ID and canonical name.
    pub fn new(id: NamespaceId, canonical: impl Into<String>) -> Self {
        let canonical = canonical.into();
        Self {
            id,
            name: canonical.clone(),
            canonical: Some(canonical),
            case: None,
            content: false,
            subpages: false,
        }
    }

    /// The name used when prefixing titles: canonical, else the local name.
    ///
    /// `None` when neither is set (the main namespace).
    pub fn prefix_name(&self) -> Option<&str> {
        self.canonical.as_deref().filter(|s| !s.is_empty()).or_else(|| {
            if self.name.is_empty() {
                None
            } else {
                Some(self.name.as_str())
            }
        })
    }
}

/// Immutable mapping from namespace ID to metadata for one wiki.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamespaceTable {
    namespaces: BTreeMap<NamespaceId, NamespaceInfo>,
}

impl NamespaceTable {
    /// Parse a siteinfo response body.
    ///
    /// `host` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`WikinsError::MalformedResponse`] when the body is not JSON, carries an
    /// API error, lacks `query.namespaces`, or contains an entry without a numeric `id`.
    pub fn from_siteinfo(host: &str, body: &str) -> Result<Self, WikinsError> {
        let malformed = |reason: String| WikinsError::MalformedResponse {
            host: host.to_string(),
            reason,
        };

        let response: SiteInfoResponse =
            serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;

        if let Some(error) = response.error {
            let code = error.get("code").and_then(Value::as_str).unwrap_or("unknown");
            let info = error.get("info").and_then(Value::as_str).unwrap_or("");
            return Err(malformed(format!("API error {code}: {info}")));
        }

        let namespaces = response
            .query
            .and_then(|q| q.namespaces)
            .ok_or_else(|| malformed("response has no query.namespaces".to_string()))?;

        namespaces
            .into_iter()
            .map(|(key, raw)| {
                let raw: RawNamespace = serde_json::from_value(raw)
                    .map_err(|e| malformed(format!("namespace {key}: {e}")))?;
                Ok(raw.into_info())
            })
            .collect()
    }

    /// Metadata for `id`, if the wiki has that namespace.
    pub fn get(&self, id: NamespaceId) -> Option<&NamespaceInfo> {
        self.namespaces.get(&id)
    }

    /// Prefix name for `id` (see [`NamespaceInfo::prefix_name`]).
    pub fn prefix_name(&self, id: NamespaceId) -> Option<&str> {
        self.get(id).and_then(NamespaceInfo::prefix_name)
    }

    /// Iterate namespaces in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &NamespaceInfo> {
        self.namespaces.values()
    }

    /// Number of namespaces.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Whether the table has no namespaces.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

impl FromIterator<NamespaceInfo> for NamespaceTable {
    fn from_iter<T: IntoIterator<Item = NamespaceInfo>>(iter: T) -> Self {
        Self {
            namespaces: iter.into_iter().map(|info| (info.id, info)).collect(),
        }
    }
}

#[derive(Deserialize)]
struct SiteInfoResponse {
    query: Option<SiteInfoQuery>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct SiteInfoQuery {
    namespaces: Option<HashMap<String, Value>>,
}

#[derive(Deserialize)]
struct RawNamespace {
    id: NamespaceId,
    canonical: Option<String>,
    #[serde(rename = "*")]
    local_v1: Option<String>,
    name: Option<String>,
    case: Option<String>,
    content: Option<Value>,
    subpages: Option<Value>,
}

impl RawNamespace {
    fn into_info(self) -> NamespaceInfo {
        NamespaceInfo {
            id: self.id,
            canonical: self.canonical,
            name: self.name.or(self.local_v1).unwrap_or_default(),
            case: self.case,
            content: flag(self.content.as_ref()),
            subpages: flag(self.subpages.as_ref()),
        }
    }
}

/// Format v1 flags are present as `""`; format v2 flags are booleans.
fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}
