//! Statistics generation from the result store
//!
//! This module provides functionality for extracting and displaying
//! statistics about everything discovered so far, across runs.

use crate::storage::Storage;
use crate::url::host_key;
use crate::LinkwalkerError;
use std::collections::HashMap;
use url::Url;

/// How many hosts `print_statistics` lists
const TOP_HOSTS: usize = 10;

/// Result store statistics summary
#[derive(Debug, Clone, Default)]
pub struct StoreStatistics {
    /// Total number of recorded sites
    pub total_sites: u64,

    /// Total number of recorded image URLs
    pub total_images: u64,

    /// Number of distinct hosts among recorded sites
    pub unique_hosts: u64,

    /// Sites without a declared favicon
    pub sites_without_favicon: u64,

    /// Hosts ordered by site count (descending, ties by name)
    pub sites_by_host: Vec<(String, u64)>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<StoreStatistics, LinkwalkerError> {
    let snapshot = storage.snapshot()?;

    let mut per_host: HashMap<String, u64> = HashMap::new();
    let mut sites_without_favicon = 0;

    for site in &snapshot.sites {
        if site.favicon.is_empty() {
            sites_without_favicon += 1;
        }
        let host = Url::parse(&site.url)
            .ok()
            .and_then(|url| host_key(&url))
            .unwrap_or_else(|| "(unknown)".to_string());
        *per_host.entry(host).or_insert(0) += 1;
    }

    let mut sites_by_host: Vec<(String, u64)> = per_host.into_iter().collect();
    sites_by_host.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(StoreStatistics {
        total_sites: snapshot.sites.len() as u64,
        total_images: snapshot.images.len() as u64,
        unique_hosts: sites_by_host.len() as u64,
        sites_without_favicon,
        sites_by_host,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Index Statistics ===\n");

    println!("Overview:");
    println!("  Sites recorded: {}", stats.total_sites);
    println!("  Images recorded: {}", stats.total_images);
    println!("  Unique hosts: {}", stats.unique_hosts);
    println!("  Sites without favicon: {}", stats.sites_without_favicon);
    println!();

    if !stats.sites_by_host.is_empty() {
        println!("Top Hosts:");
        for (host, count) in stats.sites_by_host.iter().take(TOP_HOSTS) {
            let percentage = (*count as f64 / stats.total_sites as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", host, count, percentage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonStorage, Site};
    use tempfile::TempDir;

    #[test]
    fn test_load_statistics() {
        let dir = TempDir::new().unwrap();
        let store = JsonStorage::open(dir.path().join("s.json"), dir.path().join("i.json")).unwrap();

        for (url, favicon) in [
            ("https://a.com/1", ""),
            ("https://a.com/2", "https://a.com/f.ico"),
            ("https://b.com/", ""),
        ] {
            store
                .record_site(Site::new(
                    url.to_string(),
                    "t".to_string(),
                    "d".to_string(),
                    favicon.to_string(),
                ))
                .unwrap();
        }
        store.record_image("https://a.com/x.png").unwrap();

        let stats = load_statistics(&store).unwrap();
        assert_eq!(stats.total_sites, 3);
        assert_eq!(stats.total_images, 1);
        assert_eq!(stats.unique_hosts, 2);
        assert_eq!(stats.sites_without_favicon, 2);
        assert_eq!(stats.sites_by_host[0], ("a.com".to_string(), 2));
        assert_eq!(stats.sites_by_host[1], ("b.com".to_string(), 1));
    }

    #[test]
    fn test_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonStorage::open(dir.path().join("s.json"), dir.path().join("i.json")).unwrap();
        let stats = load_statistics(&store).unwrap();
        assert_eq!(stats.total_sites, 0);
        assert!(stats.sites_by_host.is_empty());
    }
}
