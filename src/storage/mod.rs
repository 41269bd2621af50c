//! Storage module for persisting crawl results
//!
//! This module owns the two result collections:
//! - discovered sites (one per distinct URL)
//! - discovered image URLs (deduplicated)
//!
//! Both are kept as JSON arrays on disk and reloaded at startup so a resumed
//! run does not fetch known pages again.

mod json;
mod traits;

pub use json::JsonStorage;
pub use traits::{Storage, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successfully fetched and parsed page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Absolute URL, or empty when the page declares no favicon
    pub favicon: String,
    /// Defaults to load time for records written without a timestamp
    #[serde(default = "Utc::now")]
    pub discovered_at: DateTime<Utc>,
}

impl Site {
    /// Creates a site stamped with the current time
    pub fn new(url: String, title: String, description: String, favicon: String) -> Self {
        Self {
            url,
            title,
            description,
            favicon,
            discovered_at: Utc::now(),
        }
    }
}

/// Point-in-time copy of both result collections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub sites: Vec<Site>,
    pub images: Vec<String>,
}
