//! Per-host robots.txt policy cache
//!
//! Entries live for the whole run; there is no expiry. Each host owns a
//! `OnceCell`, so concurrent workers hitting the same new host wait on a
//! single robots.txt fetch instead of issuing one each.

use crate::robots::ParsedRobots;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Cache of robots policies keyed by `host[:port]`
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: DashMap<String, Arc<OnceCell<ParsedRobots>>>,
}

impl RobotsCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for a host, creating an empty one on first use
    ///
    /// The shard lock is released before the slot is returned, so callers may
    /// await on the cell without blocking other hosts.
    pub fn slot(&self, host: &str) -> Arc<OnceCell<ParsedRobots>> {
        self.entries.entry(host.to_string()).or_default().clone()
    }

    /// Returns the policy for a host if it has already been resolved
    pub fn get(&self, host: &str) -> Option<ParsedRobots> {
        self.entries
            .get(host)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of hosts with a resolved policy
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    /// Returns true if no host has a resolved policy yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
