//! Resilient HTTP fetch layer with bounded retries and fixed backoff.
//!
//! The fetcher retrieves whole files as byte buffers. Failure is never
//! surfaced to the caller as an error: after the retry budget is spent the
//! result is simply absent, and the caller decides whether to skip. The
//! retry policy is deliberately non-escalating - a fixed 1 second delay
//! between attempts, no exponential growth, no jitter - because runs are
//! strictly sequential and a single slow host must not stall the archive
//! for long.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large media files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Fixed delay between fetch attempts (1 second).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default extra attempts after the first failure.
pub const DEFAULT_RETRY_BUDGET: u32 = 1;

/// A single fetch attempt failure. Internal to the retry loop; callers of
/// [`FetchClient::fetch`] only ever observe absence.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connect, TLS, read).
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that failed.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

/// HTTP client with a bounded-retry, fixed-backoff fetch contract.
///
/// Create once and reuse across a run to benefit from connection pooling.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: reqwest::Client,
    retry_delay: Duration,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Creates a client with default timeouts and the fixed 1 s retry delay.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Overrides the delay between attempts. Used by tests to avoid real
    /// sleeps; production runs keep the default.
    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Fetches `url`, retrying up to `budget` extra times after the first
    /// failure with a fixed delay between attempts.
    ///
    /// Returns the body bytes on the first success, or `None` once the
    /// budget is exhausted. Every failed attempt is logged with `label`
    /// (the archive entry name the bytes were meant for) so skipped files
    /// can be re-fetched manually.
    pub async fn fetch(&self, url: &str, label: &str, budget: u32) -> Option<Vec<u8>> {
        let mut remaining = budget;
        loop {
            match self.try_fetch(url).await {
                Ok(bytes) => {
                    debug!(url, label, bytes = bytes.len(), "fetched");
                    return Some(bytes);
                }
                Err(error) => {
                    let host = Url::parse(url)
                        .ok()
                        .and_then(|parsed| parsed.host_str().map(str::to_string))
                        .unwrap_or_else(|| "<invalid url>".to_string());
                    warn!(%error, label, host, remaining, "fetch attempt failed");
                    if remaining == 0 {
                        return None;
                    }
                    remaining -= 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// One attempt: GET the URL and buffer the whole body.
    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}
