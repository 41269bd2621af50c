//! Crawl events published to external observers
//!
//! Events go out over a bounded `tokio::sync::broadcast` channel. Emitting
//! never blocks and never fails: with no subscribers the event is dropped,
//! and a subscriber that falls behind loses the oldest events first.

use crate::storage::Site;
use serde::Serialize;
use tokio::sync::broadcast;

/// Something an observer may want to know about a running crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// Human-readable progress message
    Log { message: String },

    /// A page was fetched, extracted and recorded
    SiteDiscovered { site: Site },

    /// A non-fatal failure tied to a URL
    Error { url: String, message: String },
}

impl CrawlEvent {
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log {
            message: message.into(),
        }
    }

    pub fn error(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Publishing side of the event channel
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CrawlEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration validation rejects that.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event without waiting for any subscriber
    pub fn emit(&self, event: CrawlEvent) {
        // An error only means nobody is listening
        let _ = self.tx.send(event);
    }

    /// Attaches a new subscriber; it sees events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CrawlEvent> {
        self.tx.subscribe()
    }

    /// Number of attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
