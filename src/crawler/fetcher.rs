//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the crawler's user agent string
//! - Single GET requests with a per-request timeout
//! - Error classification
//!
//! There are no retries here; the engine decides what to do with a failure.

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Redirect hops followed before a fetch fails
pub const MAX_REDIRECTS: usize = 10;

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code (always 2xx)
    pub status: u16,
    /// Response body decoded as text
    pub body: String,
    /// Final URL after redirects
    pub final_url: String,
}

/// Reasons a fetch can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP status {0}")]
    HttpError(u16),

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `accept_invalid_certs` - Skip TLS certificate chain validation
///
/// # Example
///
/// ```no_run
/// use linkwalker::config::UserAgentConfig;
/// use linkwalker::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), true).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    accept_invalid_certs: bool,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single GET request
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Request or body read exceeds `timeout` | `Timeout` |
/// | Connection refused, DNS or TLS failure | `ConnectionFailed` |
/// | Non-2xx status | `HttpError(status)` |
/// | Anything else (redirect limit, decode error) | `Other` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Limit for the whole request including the body
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(FetchError::HttpError(status.as_u16()));
    }

    let body = response.text().await.map_err(FetchError::from_reqwest)?;

    Ok(FetchedPage {
        status: status.as_u16(),
        body,
        final_url,
    })
}
