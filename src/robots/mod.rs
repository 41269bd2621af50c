//! Robots.txt handling module
//!
//! This module provides the politeness gate: it fetches, parses and caches
//! robots.txt per host and answers allow/deny for individual URLs.
//!
//! The gate fails open. When robots.txt cannot be retrieved (timeout,
//! connection error, any non-2xx status) every URL on that host is allowed.
//! Explicit disallow rules are honored only when robots content was actually
//! retrieved.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{ParsedRobots, UNIVERSAL_AGENT};

use crate::crawler::fetch_url;
use crate::url::{host_key, robots_url};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Allow/deny gate backed by a per-host robots.txt cache
#[derive(Debug)]
pub struct RobotsGate {
    client: Client,
    timeout: Duration,
    cache: RobotsCache,
}

impl RobotsGate {
    /// Creates a gate that fetches robots.txt with `client` and `timeout`
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            cache: RobotsCache::new(),
        }
    }

    /// Checks whether `url` may be fetched
    ///
    /// Never fails: anything that prevents reading a policy yields `true`.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let (Some(host), Some(robots_location)) = (host_key(url), robots_url(url)) else {
            return true;
        };

        let slot = self.cache.slot(&host);
        let policy = slot
            .get_or_init(|| fetch_robots(&self.client, &robots_location, self.timeout))
            .await;

        policy.is_allowed(url.as_str())
    }

    /// Number of hosts whose policy has been resolved
    pub fn cached_hosts(&self) -> usize {
        self.cache.len()
    }
}

/// Fetches and parses robots.txt, falling back to allow-all on any failure
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `robots_url` - Location of the robots.txt file
/// * `timeout` - Request timeout
pub async fn fetch_robots(client: &Client, robots_url: &Url, timeout: Duration) -> ParsedRobots {
    tracing::debug!("Fetching robots.txt: {}", robots_url);

    match fetch_url(client, robots_url.as_str(), timeout).await {
        Ok(page) => ParsedRobots::from_content(&page.body),
        Err(e) => {
            tracing::debug!(
                "robots.txt unavailable at {} ({}), allowing all",
                robots_url,
                e
            );
            ParsedRobots::allow_all()
        }
    }
}
