//! Wiki identifier to API host resolution.
//!
//! Wikimedia database names ("enwiki", "commonswiki", "dewiktionary") do not carry
//! their host names, so the host is derived with a fixed set of rules applied in order:
//!
//! 1. Empty identifiers are unresolvable.
//! 2. Well-known projects use a fixed override table ([`WELL_KNOWN_HOSTS`], extended
//!    by the `[hosts]` table of the configuration file).
//! 3. Identifiers ending in `wiki` are Wikipedias: `enwiki` → `en.wikipedia.org`.
//! 4. Anything else is split before the first `wik` project part:
//!    `enwikisource` → `en.wikisource.org`.
//!
//! Resolution never fails; `None` means the identifier cannot be mapped to a host.
//!
//! # Examples
//!
//! ```rust
//! use wikins_cli::site::resolve_host;
//!
//! assert_eq!(resolve_host("enwiki").as_deref(), Some("en.wikipedia.org"));
//! assert_eq!(resolve_host("wikidatawiki").as_deref(), Some("www.wikidata.org"));
//! assert_eq!(resolve_host("frwiktionary").as_deref(), Some("fr.wiktionary.org"));
//! assert_eq!(resolve_host(""), None);
//! ```

use std::collections::BTreeMap;

/// Fixed hosts for projects whose identifier does not follow the language-prefix scheme.
pub const WELL_KNOWN_HOSTS: &[(&str, &str)] = &[
    ("wikidatawiki", "www.wikidata.org"),
    ("wikidata", "www.wikidata.org"),
    ("commonswiki", "commons.wikimedia.org"),
    ("commons", "commons.wikimedia.org"),
    ("specieswiki", "species.wikimedia.org"),
    ("species", "species.wikimedia.org"),
    ("metawiki", "meta.wikimedia.org"),
    ("meta", "meta.wikimedia.org"),
    ("mediawikiwiki", "www.mediawiki.org"),
];

const WIKIPEDIA_SUFFIX: &str = "wiki";
const PROJECT_MARKER: &str = "wik";

/// Resolve a wiki identifier with the built-in override table only.
pub fn resolve_host(wiki: &str) -> Option<String> {
    HostResolver::default().resolve_host(wiki)
}

/// Host resolver holding the override table.
///
/// Built-in entries come from [`WELL_KNOWN_HOSTS`]; configured overrides replace or
/// extend them.
#[derive(Debug, Clone)]
pub struct HostResolver {
    overrides: BTreeMap<String, String>,
}

impl Default for HostResolver {
    fn default() -> Self {
        Self {
            overrides: WELL_KNOWN_HOSTS
                .iter()
                .map(|(wiki, host)| ((*wiki).to_string(), (*host).to_string()))
                .collect(),
        }
    }
}

impl HostResolver {
    /// Create a resolver with the built-in table plus `overrides`.
    ///
    /// Entries in `overrides` win over built-in entries for the same identifier.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut resolver = Self::default();
        for (wiki, host) in overrides {
            resolver.overrides.insert(wiki.into(), host.into());
        }
        resolver
    }

    /// Look up an identifier in the override table only.
    pub fn override_for(&self, wiki: &str) -> Option<&str> {
        self.overrides.get(wiki).map(String::as_str)
    }

    /// Determine the API host for `wiki`, or `None` if it cannot be resolved.
    ///
    /// Identifiers are used as given: an empty one, or one containing whitespace, is
    /// unresolvable rather than trimmed, so every resolvable identifier is also the
    /// exact key the cache stores it under.
    pub fn resolve_host(&self, wiki: &str) -> Option<String> {
        if wiki.is_empty() || wiki.contains(char::is_whitespace) {
            return None;
        }

        if let Some(host) = self.override_for(wiki) {
            return Some(host.to_string());
        }

        if let Some(language) = wiki.strip_suffix(WIKIPEDIA_SUFFIX) {
            if language.is_empty() {
                return None;
            }
            return Some(format!("{language}.wikipedia.org"));
        }

        split_project(wiki).map(|(language, project)| format!("{language}.{project}.org"))
    }
}

/// Split at the first `wik` that has at least one character on both sides.
fn split_project(wiki: &str) -> Option<(&str, &str)> {
    wiki.match_indices(PROJECT_MARKER)
        .map(|(index, _)| index)
        .find(|&index| index > 0 && index + PROJECT_MARKER.len() < wiki.len())
        .map(|index| wiki.split_at(index))
}
