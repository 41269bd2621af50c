//! Linkwalker: a robots-aware web discovery crawler
//!
//! This crate follows hyperlinks outward from one or more seed URLs, honoring
//! robots.txt, and indexes every page it reaches as a `Site` (title,
//! description, favicon) plus the image URLs referenced along the way.

pub mod config;
pub mod crawler;
pub mod events;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Linkwalker operations
#[derive(Debug, Error)]
pub enum LinkwalkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
///
/// Every variant is fatal: a crawl never starts with an invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, Frontier, TraversalOrder};
pub use events::{CrawlEvent, EventBus};
pub use state::UrlState;
pub use storage::{JsonStorage, Site, Storage};
