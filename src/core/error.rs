//! Error handling for wikins
//!
//! This module provides the error taxonomy of the namespace resolver cache and the
//! user-friendly error reporting used by the `wikins` binary. The error system follows
//! two principles:
//! 1. **Strongly-typed errors** for precise error handling in library code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Host resolution**: [`WikinsError::UnresolvableWiki`]
//! - **Fetching**: [`WikinsError::FetchFailed`], [`WikinsError::FetchTimeout`],
//!   [`WikinsError::MalformedResponse`]
//! - **Lookup**: [`WikinsError::NamespaceLookupFailed`]
//! - **Configuration**: [`WikinsError::ConfigError`]
//!
//! None of these are fatal inside the cache: failed fetches leave the wiki unresolved
//! and lookups degrade to the bare title. Errors only surface through the strict
//! lookup API, the [`NamespaceSource`](crate::namespace::NamespaceSource) seam and the CLI.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wikins_cli::core::{WikinsError, user_friendly_error};
//!
//! let error = WikinsError::UnresolvableWiki { wiki: "xyz".to_string() };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::namespace::NamespaceId;

/// The main error type for wikins operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WikinsError {
    /// No API host can be derived from the wiki identifier.
    #[error("Cannot determine an API host for wiki '{wiki}'")]
    UnresolvableWiki {
        /// The identifier that could not be resolved
        wiki: String,
    },

    /// Network or HTTP-level failure while fetching namespaces.
    #[error("Failed to fetch namespaces from {host}: {reason}")]
    FetchFailed {
        /// Host the request was sent to
        host: String,
        /// Underlying transport or status error
        reason: String,
    },

    /// The fetch did not complete within the configured timeout.
    #[error("Fetching namespaces from {host} timed out after {seconds}s")]
    FetchTimeout {
        /// Host the request was sent to
        host: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// The host answered, but the body is not a siteinfo namespace listing.
    #[error("Malformed namespace response from {host}: {reason}")]
    MalformedResponse {
        /// Host that produced the response
        host: String,
        /// What was wrong with the body
        reason: String,
    },

    /// Strict lookup against a wiki or namespace that is not in the cache.
    #[error("Namespace {namespace_id} of wiki '{wiki}' is not in the cache")]
    NamespaceLookupFailed {
        /// Wiki that was looked up
        wiki: String,
        /// Namespace ID that was looked up
        namespace_id: NamespaceId,
    },

    /// Configuration file could not be read, parsed or written.
    #[error("Configuration error in {path}: {reason}")]
    ConfigError {
        /// Path of the configuration file
        path: String,
        /// What went wrong
        reason: String,
    },
}

impl WikinsError {
    /// Whether a retry of the same request could reasonably succeed.
    ///
    /// Malformed bodies are deterministic and are not retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::FetchTimeout { .. })
    }
}

/// Error wrapper that adds user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without details or suggestion.
    #[must_use]
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {:#}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with suggestions where one applies.
///
/// Walks the error chain so that a [`WikinsError`] wrapped in `anyhow` context is
/// still recognised.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let wikins_error = error.chain().find_map(|e| e.downcast_ref::<WikinsError>()).cloned();

    let Some(wikins_error) = wikins_error else {
        if error.chain().any(|e| e.downcast_ref::<toml::de::Error>().is_some()) {
            return ErrorContext::new(error).with_suggestion(
                "Check the configuration file syntax, or regenerate it with 'wikins config init --force'",
            );
        }
        return ErrorContext::new(error);
    };

    match wikins_error {
        WikinsError::UnresolvableWiki { .. } => ErrorContext::new(error)
            .with_details("Identifiers must be a known project (e.g. 'commonswiki'), end in 'wiki', or contain a 'wik' project part (e.g. 'enwikisource')")
            .with_suggestion("Add an entry to [hosts] in the configuration file to map this identifier explicitly"),
        WikinsError::FetchFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check your network connection and that the wiki exists"),
        WikinsError::FetchTimeout { .. } => ErrorContext::new(error)
            .with_suggestion("Increase fetch_timeout_secs in the configuration file"),
        WikinsError::MalformedResponse { .. } => ErrorContext::new(error)
            .with_details("The host did not return a siteinfo namespace listing")
            .with_suggestion("Check api_path in the configuration file"),
        WikinsError::NamespaceLookupFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Load the wiki's namespaces before formatting titles"),
        WikinsError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'wikins config init --force' to recreate the configuration file"),
    }
}
