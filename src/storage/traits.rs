//! Storage traits and error types
//!
//! This module defines the trait interface for result stores and the
//! associated error types.

use crate::storage::{Site, Snapshot};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error on {path}: {source}")]
    Serialization {
        path: String,
        source: serde_json::Error,
    },

    #[error("Result store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for result store implementations
///
/// Collections are append-only: a site or image, once recorded, is never
/// removed. Implementations must be safe to share between worker tasks.
pub trait Storage: Send + Sync {
    /// Records a site
    ///
    /// Returns `false` without writing anything if a site with the same URL
    /// is already recorded.
    fn record_site(&self, site: Site) -> StorageResult<bool>;

    /// Records a single image URL; returns `true` if it was new
    fn record_image(&self, url: &str) -> StorageResult<bool> {
        Ok(self.record_images(&[url.to_string()])? == 1)
    }

    /// Records a batch of image URLs; returns how many were new
    fn record_images(&self, urls: &[String]) -> StorageResult<usize>;

    /// Returns a copy of both collections
    fn snapshot(&self) -> StorageResult<Snapshot>;

    /// Number of recorded sites
    fn site_count(&self) -> StorageResult<usize>;

    /// Number of recorded image URLs
    fn image_count(&self) -> StorageResult<usize>;
}
