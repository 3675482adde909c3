//! HTTP fetcher implementation
//!
//! This module handles page requests for the crawler:
//! - Building the shared HTTP client
//! - GET requests with bounded retry and backoff
//! - Content-Type screening (only HTML is processed)
//! - Error classification into a tagged result

use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// HTTP status code
        status_code: u16,
        /// Page body
        body: String,
    },

    /// The response was not HTML; skipped without counting as a failure
    NotHtml {
        /// The Content-Type received
        content_type: String,
    },

    /// Non-2xx response after retries were exhausted
    HttpError {
        /// The final HTTP status code
        status_code: u16,
    },

    /// Transport-level failure (timeout, connection refused, decode error)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Whether this result counts against the crawl's failure budget.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::HttpError { .. } | Self::NetworkError { .. })
    }
}

/// Builds the HTTP client shared by all fetches in a run.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("silkworm/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with bounded retry.
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx, HTML | Success |
/// | HTTP 2xx, other Content-Type | NotHtml, no retry |
/// | HTTP 404 and other 4xx | HttpError, no retry |
/// | HTTP 429 / 5xx | retry with backoff |
/// | Timeout / connect error | retry with backoff |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `max_attempts` - Attempts before giving up
pub async fn fetch_url(client: &Client, url: &str, max_attempts: usize) -> FetchResult {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0usize;

    loop {
        attempt += 1;
        let outcome = attempt_fetch(client, url).await;

        let retryable = match &outcome {
            FetchResult::HttpError { status_code } => {
                *status_code == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status_code >= 500
            }
            FetchResult::NetworkError { .. } => true,
            _ => false,
        };

        if retryable && attempt < max_attempts {
            tracing::debug!(
                "Fetch attempt {} of {} for {} failed, backing off",
                attempt,
                max_attempts,
                url
            );
            tokio::time::sleep(retry_backoff(attempt)).await;
            continue;
        }

        return outcome;
    }
}

async fn attempt_fetch(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                "connection failed".to_string()
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // An absent Content-Type is treated as HTML; plenty of small sites
    // never send the header.
    if !content_type.is_empty()
        && !content_type.contains("text/html")
        && !content_type.contains("application/xhtml")
    {
        return FetchResult::NotHtml { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("body decode failed: {}", e),
        },
    }
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}
