use crate::app::AppEvent;
use crate::feed::parser::{parse_feed, ParseResult};
use crate::feed::FeedEntry;
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

const MAX_RETRIES: u32 = 3;
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while retrieving a feed.
///
/// Covers the full lifecycle of a fetch: network issues, HTTP errors and
/// parsing failures. The UI shows these as a failed fetch, distinct from a
/// feed that simply had no matching entries.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// Feed XML could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
    /// Server returned 429 Too Many Requests after max retries
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// A source of feed entries.
///
/// The rest of the crate only ever asks for "the entries at this URL"; how
/// they are retrieved stays behind this trait so the UI and print mode can
/// be driven by a canned source in tests.
pub trait FeedSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<FeedEntry>, FetchError>> + Send;
}

/// [`FeedSource`] backed by an HTTP client.
///
/// # Behavior
///
/// - Each request has a 30-second timeout
/// - Rate limiting (HTTP 429) and 5xx responses trigger exponential backoff with up to 3 retries
/// - Incomplete bodies are retried the same way
/// - Other non-2xx responses fail immediately
/// - Response bodies are limited to 10MB to prevent memory exhaustion
#[derive(Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    backoff_base: Duration,
}

impl HttpFeedSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            event_tx: None,
            backoff_base: Duration::from_secs(1),
        }
    }

    /// Report rate-limit backoffs to the UI while they happen.
    pub fn with_events(mut self, event_tx: mpsc::Sender<AppEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Base delay for retries; attempt `n` waits `base * 2^n`.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    fn backoff(&self, retry_count: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(retry_count))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut retry_count = 0;

        loop {
            let response = tokio::time::timeout(REQUEST_TIMEOUT, self.client.get(url).send())
                .await
                .map_err(|_| FetchError::Timeout)?
                .map_err(FetchError::Network)?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if retry_count >= MAX_RETRIES {
                    return Err(FetchError::RateLimited(MAX_RETRIES));
                }

                let delay = self.backoff(retry_count);
                tracing::warn!(
                    feed = %url,
                    retry = retry_count,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off"
                );

                if let Some(tx) = &self.event_tx {
                    let _ = tx
                        .send(AppEvent::FeedRateLimited {
                            delay_secs: delay.as_secs().max(1),
                        })
                        .await;
                }

                tokio::time::sleep(delay).await;
                retry_count += 1;
                continue;
            }

            if response.status().is_server_error() {
                if retry_count >= MAX_RETRIES {
                    return Err(FetchError::HttpStatus(response.status().as_u16()));
                }

                let delay = self.backoff(retry_count);
                tracing::warn!(
                    feed = %url,
                    status = %response.status(),
                    retry = retry_count,
                    delay_ms = delay.as_millis() as u64,
                    "Server error, retrying after delay"
                );

                tokio::time::sleep(delay).await;
                retry_count += 1;
                continue;
            }

            // 4xx errors fail immediately
            if !response.status().is_success() {
                return Err(FetchError::HttpStatus(response.status().as_u16()));
            }

            match read_limited_bytes(response, MAX_FEED_SIZE).await {
                Ok(bytes) => return Ok(bytes),
                Err(FetchError::IncompleteResponse { expected, received }) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(FetchError::IncompleteResponse { expected, received });
                    }

                    let delay = self.backoff(retry_count);
                    tracing::debug!(
                        feed = %url,
                        expected = expected,
                        received = received,
                        attempt = retry_count + 1,
                        "Retrying incomplete download"
                    );

                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
        let bytes = self.fetch_bytes(url).await?;

        let ParseResult { entries, skipped } =
            parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

        if skipped > 0 {
            tracing::warn!(feed = %url, skipped, "Entries without a link skipped");
        }
        tracing::debug!(feed = %url, entries = entries.len(), "Feed fetched");

        Ok(entries)
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
