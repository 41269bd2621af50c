//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a per-request timeout
//! - HTML parsing into page facts and outgoing links
//! - The shared frontier of claimed and pending URLs
//! - Overall crawl coordination over a bounded worker pool

mod engine;
mod fetcher;
mod frontier;
mod parser;

pub use engine::CrawlEngine;
pub use fetcher::{build_http_client, fetch_url, FetchError, FetchedPage, MAX_REDIRECTS};
pub use frontier::{Frontier, TraversalOrder};
pub use parser::{extract_page, PageFacts, DEFAULT_DESCRIPTION, DEFAULT_TITLE};

use crate::config::Config;
use crate::events::EventBus;
use crate::output::CrawlReport;
use crate::storage::JsonStorage;
use crate::LinkwalkerError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// Convenience entry point that opens the JSON result store named by the
/// configuration and crawls until the frontier drains. Events go to `events`.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `events` - Bus to publish crawl events on
pub async fn crawl(config: &Config, events: EventBus) -> Result<CrawlReport, LinkwalkerError> {
    let store = JsonStorage::open(&config.output.sites_path, &config.output.images_path)?;
    let mut engine = CrawlEngine::new(config, Arc::new(store), events)?;
    engine.run().await
}
