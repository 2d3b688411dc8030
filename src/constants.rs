//! Global constants used throughout the wikins codebase.
//!
//! Timeout durations, retry parameters and endpoint defaults that are shared
//! between the cache, the HTTP source and the configuration layer.

use std::time::Duration;

/// Default timeout for a single namespace fetch, retries included (30 seconds).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra time a waiter grants an in-flight fetch beyond the fetch timeout.
pub const PENDING_WAIT_MARGIN: Duration = Duration::from_secs(5);

/// Timeout for waiting on another caller's in-flight fetch.
pub fn pending_state_timeout(fetch_timeout: Duration) -> Duration {
    fetch_timeout + PENDING_WAIT_MARGIN
}

/// Maximum backoff delay between fetch retries (2 seconds).
pub const MAX_BACKOFF_DELAY_MS: u64 = 2_000;

/// Starting delay for exponential backoff between fetch retries (100ms).
///
/// Grows exponentially on each retry attempt, capped at [`MAX_BACKOFF_DELAY_MS`].
pub const STARTING_BACKOFF_DELAY_MS: u64 = 100;

/// Default number of retries after a failed fetch attempt.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Scheme used to reach API hosts.
pub const DEFAULT_API_SCHEME: &str = "https";

/// Path of the MediaWiki action API on every Wikimedia host.
pub const DEFAULT_API_PATH: &str = "/w/api.php";

/// User-Agent sent with every API request.
///
/// Wikimedia rejects requests without a descriptive agent.
pub const DEFAULT_USER_AGENT: &str =
    concat!("wikins/", env!("CARGO_PKG_VERSION"), " (namespace resolver cache)");
