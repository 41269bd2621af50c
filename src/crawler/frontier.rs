//! Crawl frontier: claimed-URL set plus the pending work queue
//!
//! `claim` is the single synchronization point of the engine. It is one atomic
//! insert into a concurrent set, so two workers racing on the same URL can
//! never both win.

use dashmap::DashSet;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Order in which the links found on one page are offered for claiming
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalOrder {
    /// Shuffle before claiming, so the first link of every page does not
    /// always win (weak load spreading, not breadth/depth control)
    #[default]
    Shuffle,

    /// Keep document order
    Document,
}

impl TraversalOrder {
    /// Arranges links in place according to the policy
    pub fn arrange(&self, links: &mut [String]) {
        match self {
            Self::Shuffle => links.shuffle(&mut rand::rng()),
            Self::Document => {}
        }
    }
}

/// Set of claimed URLs and the queue of claimed-but-unprocessed URLs
#[derive(Debug, Default)]
pub struct Frontier {
    claimed: DashSet<String>,
    pending: Mutex<VecDeque<String>>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier whose claimed set is pre-seeded
    ///
    /// Used on resume: URLs recorded by a previous run are never fetched again.
    /// Nothing is enqueued.
    pub fn with_claimed<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let frontier = Self::new();
        for url in urls {
            frontier.claimed.insert(url);
        }
        frontier
    }

    /// Claims `url`; returns true only for the first caller
    pub fn claim(&self, url: &str) -> bool {
        self.claimed.insert(url.to_string())
    }

    /// Claims `url` and, if it was new, appends it to the pending queue
    pub fn offer(&self, url: &str) -> bool {
        if !self.claim(url) {
            return false;
        }
        self.lock_pending().push_back(url.to_string());
        true
    }

    /// Arranges `links` with `order`, then offers each one
    ///
    /// Returns the number of links that were newly claimed.
    pub fn offer_all(&self, mut links: Vec<String>, order: TraversalOrder) -> usize {
        order.arrange(&mut links);
        links.iter().filter(|link| self.offer(link)).count()
    }

    /// Puts an already-claimed URL back at the head of the queue
    ///
    /// Used when a worker gives a URL up without fetching it.
    pub fn requeue(&self, url: String) {
        debug_assert!(self.is_claimed(&url));
        self.lock_pending().push_front(url);
    }

    /// Pops the next pending URL
    pub fn next_pending(&self) -> Option<String> {
        self.lock_pending().pop_front()
    }

    /// Number of URLs waiting to be processed
    pub fn pending_len(&self) -> usize {
        self.lock_pending().len()
    }

    /// Number of URLs claimed so far, including pre-seeded ones
    pub fn claimed_len(&self) -> usize {
        self.claimed.len()
    }

    /// Returns true if `url` has been claimed
    pub fn is_claimed(&self, url: &str) -> bool {
        self.claimed.contains(url)
    }

    // The queue holds plain strings and is only mutated by push/pop, so a
    // poisoned lock still guards a consistent VecDeque.
    fn lock_pending(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
