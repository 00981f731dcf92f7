//! Page fetching from URLs, files, and stdin.
//!
//! Extraction never performs I/O itself. Multi-page drivers receive a
//! [`PageFetcher`] and ask it for page sources one at a time; [`HttpFetcher`]
//! is the network implementation (feature `fetch`), tests use in-memory ones.

use std::fs;
use std::future::Future;
use std::path::PathBuf;

use crate::{PelotonError, Result};

#[cfg(feature = "fetch")]
use std::sync::{Mutex, PoisonError};
#[cfg(feature = "fetch")]
use std::time::{Duration, Instant};

#[cfg(feature = "fetch")]
use reqwest::Client;
#[cfg(feature = "fetch")]
use tracing::info;
#[cfg(feature = "fetch")]
use url::Url;

/// HTTP client configuration for fetching pages.
///
/// This struct controls timeout, user agent and pacing of HTTP requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Minimum delay between two consecutive requests, in milliseconds.
    pub request_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Peloton/0.1)".to_string(),
            request_delay_ms: 1000,
        }
    }
}

impl FetchConfig {
    /// Creates a new builder for FetchConfig.
    ///
    /// # Example
    ///
    /// ```rust
    /// use peloton_core::FetchConfig;
    ///
    /// let config = FetchConfig::builder().timeout(10).request_delay_ms(0).build();
    /// assert_eq!(config.timeout, 10);
    /// ```
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::new()
    }
}

/// Builder for FetchConfig.
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: FetchConfig::default() }
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, value: u64) -> Self {
        self.config.timeout = value;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.user_agent = value.into();
        self
    }

    /// Sets the delay between consecutive requests.
    pub fn request_delay_ms(mut self, value: u64) -> Self {
        self.config.request_delay_ms = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> FetchConfig {
        self.config
    }
}

impl Default for FetchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of page HTML for the multi-page drivers.
///
/// Implementations return the full page source for a fully-qualified URL.
/// Drivers call it sequentially and never issue two requests at once.
pub trait PageFetcher {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Fetches pages over HTTP with a timeout and a politeness delay.
#[cfg(feature = "fetch")]
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
    last_request: Mutex<Option<Instant>>,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    /// Builds the HTTP client from `config`.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(PelotonError::HttpError)?;

        Ok(Self { client, config, last_request: Mutex::new(None) })
    }

    /// Sleeps until `request_delay_ms` has passed since the previous request.
    async fn pace(&self) {
        let delay = Duration::from_millis(self.config.request_delay_ms);
        let wait = {
            let last = self.last_request.lock().unwrap_or_else(PoisonError::into_inner);
            last.map(|at| delay.saturating_sub(at.elapsed()))
        };

        if let Some(wait) = wait.filter(|w| !w.is_zero()) {
            tokio::time::sleep(wait).await;
        }

        *self.last_request.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }
}

#[cfg(feature = "fetch")]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let parsed_url = parse_url(url)?;
        self.pace().await;
        info!(url = %parsed_url, "fetching page");

        let response = self
            .client
            .get(parsed_url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PelotonError::Timeout { timeout: self.config.timeout }
                } else {
                    PelotonError::HttpError(e)
                }
            })?;

        let content = response.error_for_status()?.text().await?;
        Ok(content)
    }
}

#[cfg(feature = "fetch")]
fn parse_url(url: &str) -> Result<Url> {
    let parsed_url = Url::parse(url).map_err(|e| PelotonError::InvalidUrl(e.to_string()))?;

    match parsed_url.scheme() {
        "http" | "https" => Ok(parsed_url),
        other => Err(PelotonError::InvalidUrl(format!(
            "unsupported scheme {}: URL must be http:// or https://",
            other
        ))),
    }
}

/// Fetches one page's HTML from a URL.
///
/// Convenience wrapper building a one-off [`HttpFetcher`].
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    HttpFetcher::new(config.clone())?.fetch_page(url).await
}

/// Reads a saved page from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(PelotonError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(PelotonError::from)
    }
}

/// Reads a page from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(PelotonError::from)?;

    Ok(buffer)
}
