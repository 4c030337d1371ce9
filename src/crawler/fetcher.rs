//! HTTP fetcher implementation
//!
//! This module wraps the HTTP client with the harvest's fetch policy:
//! - A fixed browser-like header set (the site blocks unidentified clients)
//! - A per-attempt timeout
//! - Bounded retries for timeouts only
//!
//! Fetch failures never propagate as errors. Callers get either the page
//! body or [`FetchResult::Unavailable`] and decide what to skip.

use crate::config::FetcherConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Page body content
        body: String,
    },

    /// The page could not be fetched within the retry policy
    Unavailable {
        /// Description of the last failure
        error: String,
        /// Number of attempts made
        attempts: u32,
    },
}

impl FetchResult {
    /// Returns the body of a successful fetch
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body } => Some(body),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Classification of a single failed attempt
#[derive(Debug)]
enum AttemptError {
    /// The request or body read timed out; worth retrying
    Timeout,

    /// Bad status, connection refused, DNS failure, or a broken body
    Fatal(String),
}

impl From<reqwest::Error> for AttemptError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_status() {
            match e.status() {
                Some(status) => Self::Fatal(format!("HTTP {}", status)),
                None => Self::Fatal(e.to_string()),
            }
        } else if e.is_connect() {
            Self::Fatal(format!("Connection failed: {}", e))
        } else {
            Self::Fatal(e.to_string())
        }
    }
}

/// Builds an HTTP client with the configured headers and timeout
///
/// # Example
///
/// ```
/// use reel_harvest::config::FetcherConfig;
/// use reel_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages under the retry policy
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_attempts: u32,
}

impl Fetcher {
    /// Creates a fetcher from the fetch policy configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            max_attempts: config.max_attempts.max(1),
        })
    }

    /// Fetches a URL, retrying on timeout
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Timeout | Retry, up to `max-attempts` attempts in total |
    /// | HTTP 4xx / 5xx | Immediate → Unavailable |
    /// | Connection refused / DNS failure | Immediate → Unavailable |
    /// | Body read error | Immediate → Unavailable |
    ///
    /// There is no pause between attempts; the per-attempt timeout already
    /// spaces them out.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.attempt(url).await {
                Ok(body) => return FetchResult::Success { body },
                Err(AttemptError::Timeout) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "Timeout fetching {}, retrying ({}/{})",
                        url,
                        attempt,
                        self.max_attempts
                    );
                }
                Err(AttemptError::Timeout) => {
                    tracing::warn!(
                        "Timeout fetching {}, giving up after {} attempts",
                        url,
                        attempt
                    );
                    return FetchResult::Unavailable {
                        error: "Request timeout".to_string(),
                        attempts: attempt,
                    };
                }
                Err(AttemptError::Fatal(error)) => {
                    tracing::warn!("Error fetching {}: {}", url, error);
                    return FetchResult::Unavailable {
                        error,
                        attempts: attempt,
                    };
                }
            }
        }
    }

    /// Makes a single GET request and reads the whole body
    async fn attempt(&self, url: &str) -> Result<String, AttemptError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        tracing::debug!(
            "Fetched {} (status {}, final URL {})",
            url,
            response.status().as_u16(),
            response.url()
        );
        Ok(response.text().await?)
    }
}
