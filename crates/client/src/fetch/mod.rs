//! HTTP fetch pipeline for static extraction.
//!
//! ### URL Normalization
//! - Trim whitespace, prepend `https://` when no http(s) scheme is given
//! - Require a host, lowercase it, remove fragments
//!
//! ### Request Profile
//! - Browser-like header sets (User-Agent, Accept, Accept-Language)
//! - One retry with the alternate profile on request failure
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, normalize};

use pagechat_core::{AppConfig, Error};

/// A browser-identifying header set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderProfile {
    pub name: &'static str,
    pub user_agent: &'static str,
    pub accept: &'static str,
    pub accept_language: &'static str,
}

/// Chrome on Windows.
pub const PRIMARY_PROFILE: HeaderProfile = HeaderProfile {
    name: "chrome-windows",
    user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
                 Chrome/124.0.0.0 Safari/537.36",
    accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    accept_language: "en-US,en;q=0.9",
};

/// Firefox on macOS, used for the single retry.
pub const ALTERNATE_PROFILE: HeaderProfile = HeaderProfile {
    name: "firefox-macos",
    user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:125.0) Gecko/20100101 Firefox/125.0",
    accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    accept_language: "en-GB,en;q=0.7",
};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Header set for the first attempt.
    pub primary: HeaderProfile,

    /// Header set for the retry.
    pub alternate: HeaderProfile,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            primary: PRIMARY_PROFILE,
            alternate: ALTERNATE_PROFILE,
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(10_000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { max_bytes: config.max_bytes, timeout: config.timeout(), ..Default::default() }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn html(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Failure of a single request attempt.
#[derive(Debug, Clone, thiserror::Error)]
enum AttemptError {
    #[error("request timed out after {0}ms")]
    Timeout(u128),

    #[error("request failed: {0}")]
    Request(String),

    #[error("status {0}")]
    Status(u16),

    #[error("{size} bytes exceeds {limit}")]
    TooLarge { size: usize, limit: usize },
}

impl AttemptError {
    fn is_retryable(&self) -> bool {
        !matches!(self, AttemptError::TooLarge { .. })
    }
}

/// Source of raw page HTML.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// Fetch `url` and return the response body with metadata.
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error>;
}

/// HTTP fetch client with browser-like headers and one retry.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch_with(&self, url: &Url, profile: &HeaderProfile) -> Result<FetchResponse, AttemptError> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.as_str())
            .header(header::USER_AGENT, profile.user_agent)
            .header(header::ACCEPT, profile.accept)
            .header(header::ACCEPT_LANGUAGE, profile.accept_language)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AttemptError::Timeout(self.config.timeout.as_millis())
                } else {
                    AttemptError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(AttemptError::TooLarge { size: len as usize, limit: self.config.max_bytes });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AttemptError::Request(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(AttemptError::TooLarge { size: bytes.len(), limit: self.config.max_bytes });
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            profile = profile.name,
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            final_url,
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse { url: url.clone(), final_url, status, content_type, bytes, fetch_ms })
    }
}

#[async_trait]
impl HtmlFetcher for FetchClient {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let first = match self.fetch_with(url, &self.config.primary).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        if !first.is_retryable() {
            return Err(Error::Network(first.to_string()));
        }

        tracing::warn!(
            url = %url,
            error = %first,
            profile = self.config.alternate.name,
            "static fetch failed, retrying with alternate headers"
        );

        self.fetch_with(url, &self.config.alternate)
            .await
            .map_err(|second| Error::Network(format!("{second} (first attempt: {first})")))
    }
}
