//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building HTTP clients with the identifying user agent and timeout
//! - Rejecting non-HTTP(S) URLs before any network I/O
//! - Following redirects only while they stay on the requested site
//! - Classifying failures into `FetchError` variants
//!
//! There are no retries at this layer; a failed fetch is recorded on the page
//! and the crawl moves on.

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Single-page HTML source used by the crawler
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches one page and returns its body
    ///
    /// Implementations must fail with `FetchError::InvalidUrl` for anything
    /// that is not an absolute HTTP or HTTPS URL, without touching the network.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Identification sent with every request
/// * `timeout` - Per-request timeout covering connect and body
/// * `max_redirects` - Redirect hops followed before giving up
///
/// A redirect to another host is not followed; the 3xx response is returned
/// as is and surfaces as `FetchError::HttpStatus`. `www.` is ignored for this
/// check, so `example.com` may redirect to `www.example.com`.
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
    max_redirects: usize,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(same_site_policy(max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

fn same_site_policy(max_redirects: usize) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            return attempt.error("too many redirects");
        }

        let stays_on_site = attempt
            .previous()
            .first()
            .map_or(true, |origin| same_site(origin, attempt.url()));

        if stays_on_site {
            attempt.follow()
        } else {
            tracing::debug!("Not following off-site redirect to {}", attempt.url());
            attempt.stop()
        }
    })
}

fn same_site(origin: &Url, target: &Url) -> bool {
    let host = |url: &Url| {
        url.host_str()
            .map(|h| h.to_lowercase().trim_start_matches("www.").to_string())
    };
    host(origin) == host(target) && origin.port() == target.port()
}

/// Checks that a URL is something the fetcher may request
///
/// # Returns
///
/// * `Ok(Url)` - Parsed absolute HTTP(S) URL
/// * `Err(FetchError::InvalidUrl)` - Relative, malformed, host-less, or non-HTTP URL
pub fn validate_fetch_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        reason: format!("{}: {}", url, e),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(FetchError::InvalidUrl {
            reason: format!("unsupported scheme '{}' in {}", parsed.scheme(), url),
        });
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(FetchError::InvalidUrl {
            reason: format!("missing host in {}", url),
        });
    }

    Ok(parsed)
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from the user agent and fetcher sections of the config
    pub fn new(
        user_agent: &UserAgentConfig,
        config: &FetcherConfig,
    ) -> Result<Self, reqwest::Error> {
        Self::with_timeout(
            user_agent,
            Duration::from_secs(config.timeout_secs),
            config.max_redirects,
        )
    }

    /// Creates a fetcher with an explicit timeout
    pub fn with_timeout(
        user_agent: &UserAgentConfig,
        timeout: Duration,
        max_redirects: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, timeout, max_redirects)?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> FetchError {
        let reason = if error.is_timeout() {
            format!("request to {} timed out after {:?}", url, self.timeout)
        } else if error.is_connect() {
            format!("connection to {} failed: {}", url, error)
        } else if error.is_redirect() {
            format!("too many redirects from {}", url)
        } else {
            error.to_string()
        };
        FetchError::Network { reason }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = validate_fetch_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.classify(url, e))
    }
}
