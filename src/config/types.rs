use crate::crawler::TraversalOrder;
use serde::Deserialize;

/// Main configuration structure for Linkwalker
///
/// Every section is optional in the TOML file; missing sections fall back to
/// their defaults, so a run can be configured entirely from the command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// URLs the crawl starts from
    #[serde(default)]
    pub seed_urls: Vec<String>,

    /// Number of concurrent worker slots
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Timeout for a page fetch (milliseconds)
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Timeout for a robots.txt fetch (milliseconds)
    #[serde(default = "default_robots_timeout_ms")]
    pub robots_timeout_ms: u64,

    /// Order in which links found on one page are offered to the frontier
    #[serde(default)]
    pub traversal_order: TraversalOrder,

    /// Stop gracefully after this many pages were recorded in one run
    #[serde(default)]
    pub max_pages: Option<u64>,

    /// Skip TLS certificate chain validation
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_urls: Vec::new(),
            max_workers: default_max_workers(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            robots_timeout_ms: default_robots_timeout_ms(),
            traversal_order: TraversalOrder::default(),
            max_pages: None,
            accept_invalid_certs: default_accept_invalid_certs(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler (optional)
    #[serde(default)]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        if self.contact_url.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            )
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: String::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the JSON array of discovered sites
    #[serde(default = "default_sites_path")]
    pub sites_path: String,

    /// Path to the JSON array of discovered image URLs
    #[serde(default = "default_images_path")]
    pub images_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sites_path: default_sites_path(),
            images_path: default_images_path(),
        }
    }
}

/// Event channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Number of events buffered for each subscriber before the oldest is dropped
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

fn default_max_workers() -> usize {
    8
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_robots_timeout_ms() -> u64 {
    5_000
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_crawler_name() -> String {
    "linkwalker".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_sites_path() -> String {
    "sites.json".to_string()
}

fn default_images_path() -> String {
    "images.json".to_string()
}

fn default_event_capacity() -> usize {
    1024
}
