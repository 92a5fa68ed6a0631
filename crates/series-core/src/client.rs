//! HTTP client with rate limiting for the listing site
//!
//! This module provides the `Fetcher` seam the extraction core consumes and a
//! rate-limited `reqwest` implementation that sends browser-like headers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{Result, ScrapeError};

/// Default User-Agent mimicking a modern browser
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default Accept header for HTML pages
const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Default Accept-Language header for Arabic content
const DEFAULT_ACCEPT_LANGUAGE: &str = "ar,en-US;q=0.7,en;q=0.3";

/// Source of page content.
///
/// Implementations return `Err` for network and status failures; callers
/// treat any error as "no content" and carry on.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Rate limiter to control request frequency
///
/// Ensures that requests are spaced at least `min_interval` apart
/// to avoid overwhelming the source site.
pub struct RateLimiter {
    /// Minimum interval between requests
    min_interval: Duration,
    /// Timestamp of the last request
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// A non-positive or non-finite rate disables limiting.
    ///
    /// # Example
    /// ```
    /// use series_core::client::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(2.0); // 2 requests per second
    /// assert_eq!(limiter.min_interval().as_millis(), 500);
    /// ```
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Acquire permission to make a request
    ///
    /// Waits if necessary so the minimum interval between requests is respected.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum requests per second (default: 5.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 15)
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// Referer sent with every request, usually the site origin
    pub referer: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5.0,
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            referer: None,
        }
    }
}

/// HTTP client for the listing site
///
/// This client automatically:
/// - Limits request rate to avoid server overload
/// - Sets a fixed browser-like identity (user agent, accept headers, referer)
/// - Maps non-success statuses onto `ScrapeError`
pub struct SiteClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    /// Rate limiter for request throttling
    rate_limiter: RateLimiter,
}

impl SiteClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    ///
    /// # Errors
    /// Returns an error if a header value is invalid or the HTTP client
    /// cannot be created
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);
        if let Some(referer) = &config.referer {
            headers.insert(REFERER, header_value(referer)?);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second),
        })
    }

    /// Get a reference to the rate limiter (for testing)
    #[cfg(test)]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

#[async_trait]
impl Fetcher for SiteClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.rate_limiter.acquire().await;

        tracing::debug!(url, "fetching");
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.text().await?);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScrapeError::NotFound(url.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ScrapeError::RateLimited(url.to_string()));
        }

        Err(ScrapeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ScrapeError::InvalidUrl(format!("invalid header value {:?}: {}", value, e)))
}
