//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier (skipping URLs recorded by earlier runs)
//! - Dispatching claimed URLs to a bounded set of worker tasks
//! - Driving each URL through robots check, fetch, extraction and recording
//! - Stopping on quiescence or cancellation

use crate::config::{validate, Config, CrawlerConfig};
use crate::crawler::frontier::{Frontier, TraversalOrder};
use crate::crawler::parser::extract_page;
use crate::crawler::{build_http_client, fetch_url};
use crate::events::{CrawlEvent, EventBus};
use crate::output::CrawlReport;
use crate::robots::RobotsGate;
use crate::state::UrlState;
use crate::storage::{Site, Storage};
use crate::url::parse_crawl_url;
use crate::LinkwalkerError;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{self, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use url::Url;

/// State shared by every worker task
struct Shared {
    client: Client,
    robots: RobotsGate,
    frontier: Frontier,
    store: Arc<dyn Storage>,
    events: EventBus,
    order: TraversalOrder,
    fetch_timeout: Duration,
    cancel: CancellationToken,
}

/// What a worker reports after driving one URL as far as it could go
///
/// `state` is terminal unless the run was cancelled before the URL was
/// fetched, in which case it is still `Claimed` and back in the queue.
#[derive(Debug)]
struct UrlOutcome {
    url: String,
    state: UrlState,
    images_added: usize,
    duplicate_links: usize,
}

impl UrlOutcome {
    fn claimed(url: String) -> Self {
        Self {
            url,
            state: UrlState::Claimed,
            images_added: 0,
            duplicate_links: 0,
        }
    }

    fn is_interrupted(&self) -> bool {
        self.state == UrlState::Claimed
    }

    fn advance(&mut self, next: UrlState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
    }
}

/// Bookkeeping for one call to `CrawlEngine::run`
struct RunProgress {
    report: CrawlReport,
    recorded: u64,
    started: Instant,
    /// URL each running worker task was given, by task id
    in_flight: HashMap<task::Id, String>,
}

impl RunProgress {
    fn new() -> Self {
        Self {
            report: CrawlReport::default(),
            recorded: 0,
            started: Instant::now(),
            in_flight: HashMap::new(),
        }
    }
}

/// Main crawl engine
pub struct CrawlEngine {
    config: CrawlerConfig,
    shared: Arc<Shared>,
}

impl CrawlEngine {
    /// Creates a new engine
    ///
    /// The configuration is validated here; any problem is fatal and the crawl
    /// does not begin. The frontier is pre-seeded with every site URL already
    /// in `store`.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - Where sites and images are recorded
    /// * `events` - Bus the engine publishes crawl events on
    pub fn new(
        config: &Config,
        store: Arc<dyn Storage>,
        events: EventBus,
    ) -> Result<Self, LinkwalkerError> {
        validate(config)?;

        let client = build_http_client(&config.user_agent, config.crawler.accept_invalid_certs)?;
        let robots = RobotsGate::new(
            client.clone(),
            Duration::from_millis(config.crawler.robots_timeout_ms),
        );

        let snapshot = store.snapshot()?;
        let frontier = Frontier::with_claimed(snapshot.sites.into_iter().map(|site| site.url));
        tracing::info!(
            "Frontier pre-seeded with {} known URLs",
            frontier.claimed_len()
        );

        Ok(Self {
            config: config.crawler.clone(),
            shared: Arc::new(Shared {
                client,
                robots,
                frontier,
                store,
                events,
                order: config.crawler.traversal_order,
                fetch_timeout: Duration::from_millis(config.crawler.fetch_timeout_ms),
                cancel: CancellationToken::new(),
            }),
        })
    }

    /// Token that stops the run when cancelled
    ///
    /// Cancellation stops dispatching and keeps workers from starting page
    /// fetches; fetches already on the wire complete or time out.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shared.cancel.clone()
    }

    /// The run's frontier
    pub fn frontier(&self) -> &Frontier {
        &self.shared.frontier
    }

    /// Runs the crawl until quiescence or cancellation
    ///
    /// Failures of individual URLs never end the run; they are logged,
    /// published as `CrawlEvent::Error` and counted in the report.
    pub async fn run(&mut self) -> Result<CrawlReport, LinkwalkerError> {
        let mut progress = RunProgress::new();

        self.seed(&mut progress.report);
        tracing::info!(
            "Starting crawl with {} workers, {} URLs pending",
            self.config.max_workers,
            self.shared.frontier.pending_len()
        );

        let mut workers: JoinSet<UrlOutcome> = JoinSet::new();
        let mut stopping = false;

        loop {
            if !stopping && self.shared.cancel.is_cancelled() {
                stopping = true;
                self.announce_stop(workers.len());
            }

            if !stopping {
                while workers.len() < self.config.max_workers {
                    let Some(url) = self.shared.frontier.next_pending() else {
                        break;
                    };
                    let shared = Arc::clone(&self.shared);
                    let task_url = url.clone();
                    let handle = workers.spawn(async move { process_url(&shared, task_url).await });
                    progress.in_flight.insert(handle.id(), url);
                }
            }

            // Queue drained (or dispatch stopped) and nothing in flight
            if workers.is_empty() {
                break;
            }

            tokio::select! {
                joined = workers.join_next_with_id() => {
                    if let Some(joined) = joined {
                        self.settle(&mut progress, joined);
                    }
                },
                _ = self.shared.cancel.cancelled(), if !stopping => {
                    stopping = true;
                    self.announce_stop(workers.len());
                }
            }
        }

        let mut report = progress.report;
        report.cancelled = stopping;
        report.elapsed = progress.started.elapsed();

        let message = format!(
            "Crawl finished: {} pages recorded, {} failed, {} disallowed in {:.1?}",
            report.recorded(),
            report.failed(),
            report.disallowed(),
            report.elapsed
        );
        tracing::info!("{}", message);
        self.shared.events.emit(CrawlEvent::log(message));

        Ok(report)
    }

    /// Folds one finished worker task into the run's progress
    fn settle(
        &self,
        progress: &mut RunProgress,
        joined: Result<(task::Id, UrlOutcome), JoinError>,
    ) {
        match joined {
            Ok((id, outcome)) => {
                progress.in_flight.remove(&id);
                if outcome.is_interrupted() {
                    progress.report.interrupted += 1;
                    return;
                }
                if outcome.state == UrlState::Recorded {
                    progress.recorded += 1;
                    self.on_recorded(progress.recorded, progress.started);
                }
                progress.report.count(outcome.state);
                progress.report.images_added += outcome.images_added as u64;
                for _ in 0..outcome.duplicate_links {
                    progress.report.count(UrlState::Duplicate);
                }
            }
            Err(e) => {
                let url = progress.in_flight.remove(&e.id()).unwrap_or_default();
                tracing::error!("Worker task for {} failed: {}", url, e);
                self.shared
                    .events
                    .emit(CrawlEvent::error(&url, format!("worker task failed: {}", e)));
                progress.report.count(UrlState::FetchFailed);
            }
        }
    }

    /// Offers every configured seed to the frontier
    fn seed(&self, report: &mut CrawlReport) {
        for seed in &self.config.seed_urls {
            let seed = seed.trim();
            if self.shared.frontier.offer(seed) {
                tracing::debug!("Seeded {}", seed);
            } else {
                tracing::info!("Seed {} already indexed, skipping", seed);
                self.shared
                    .events
                    .emit(CrawlEvent::log(format!("Already indexed: {}", seed)));
                report.count(UrlState::Duplicate);
            }
        }
    }

    fn on_recorded(&self, recorded: u64, start_time: Instant) {
        if recorded % 10 == 0 {
            let rate = recorded as f64 / start_time.elapsed().as_secs_f64();
            tracing::info!(
                "Progress: {} pages recorded, {} pending, {:.2} pages/sec",
                recorded,
                self.shared.frontier.pending_len(),
                rate
            );
        }

        if let Some(max_pages) = self.config.max_pages {
            if recorded >= max_pages && !self.shared.cancel.is_cancelled() {
                tracing::info!("Reached page limit of {}", max_pages);
                self.shared.cancel.cancel();
            }
        }
    }

    fn announce_stop(&self, in_flight: usize) {
        let message = format!(
            "Stopping crawl: waiting for {} in-flight pages, {} left pending",
            in_flight,
            self.shared.frontier.pending_len()
        );
        tracing::info!("{}", message);
        self.shared.events.emit(CrawlEvent::log(message));
    }
}

/// Drives one claimed URL to a terminal state
///
/// Claimed -> Disallowed | Fetching -> (FetchFailed | Fetched -> Extracted -> Recorded)
///
/// If the run is cancelled before the page fetch starts, the URL goes back to
/// the pending queue and the outcome stays `Claimed`.
async fn process_url(shared: &Shared, url: String) -> UrlOutcome {
    let mut outcome = UrlOutcome::claimed(url);
    let url = outcome.url.clone();

    let target = match parse_crawl_url(&url) {
        Ok(target) => target,
        Err(e) => {
            // Frontier entries are validated before they are offered
            tracing::warn!("Unparseable URL in frontier {}: {}", url, e);
            outcome.advance(UrlState::Fetching);
            outcome.advance(UrlState::FetchFailed);
            shared.events.emit(CrawlEvent::error(&url, e.to_string()));
            return outcome;
        }
    };

    if shared.cancel.is_cancelled() {
        return interrupt(shared, outcome);
    }

    if !shared.robots.is_allowed(&target).await {
        tracing::debug!("URL {} disallowed by robots.txt", url);
        shared
            .events
            .emit(CrawlEvent::log(format!("Disallowed by robots.txt: {}", url)));
        outcome.advance(UrlState::Disallowed);
        return outcome;
    }

    // The robots lookup may have waited on the network
    if shared.cancel.is_cancelled() {
        return interrupt(shared, outcome);
    }

    outcome.advance(UrlState::Fetching);
    shared.events.emit(CrawlEvent::log(format!("Crawling: {}", url)));

    let page = match fetch_url(&shared.client, &url, shared.fetch_timeout).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Fetch failed for {}: {}", url, e);
            shared
                .events
                .emit(CrawlEvent::error(&url, format!("Error at {}: {}", url, e)));
            outcome.advance(UrlState::FetchFailed);
            return outcome;
        }
    };
    outcome.advance(UrlState::Fetched);

    // Relative references resolve against where the page actually lives
    let base = Url::parse(&page.final_url).unwrap_or(target);
    let facts = extract_page(&page.body, &base);
    outcome.advance(UrlState::Extracted);

    let site = Site::new(url.clone(), facts.title, facts.description, facts.favicon);

    // Store writes serialize and touch the disk; keep them off the runtime threads
    let store = Arc::clone(&shared.store);
    let stored_site = site.clone();
    let images = facts.images;
    let written = task::spawn_blocking(move || {
        (store.record_site(stored_site), store.record_images(&images))
    })
    .await;

    match written {
        Ok((site_written, images_written)) => {
            match site_written {
                Ok(true) => shared.events.emit(CrawlEvent::SiteDiscovered { site }),
                Ok(false) => tracing::debug!("Site {} was already recorded", url),
                Err(e) => {
                    tracing::error!("Failed to record site {}: {}", url, e);
                    shared
                        .events
                        .emit(CrawlEvent::error(&url, format!("failed to record site: {}", e)));
                }
            }

            match images_written {
                Ok(added) => outcome.images_added = added,
                Err(e) => {
                    tracing::error!("Failed to record images from {}: {}", url, e);
                    shared
                        .events
                        .emit(CrawlEvent::error(&url, format!("failed to record images: {}", e)));
                }
            }
        }
        Err(e) => {
            tracing::error!("Store task for {} failed: {}", url, e);
            shared
                .events
                .emit(CrawlEvent::error(&url, format!("failed to record page: {}", e)));
        }
    }

    let found = facts.links.len();
    let claimed = shared.frontier.offer_all(facts.links, shared.order);
    outcome.duplicate_links = found - claimed;
    tracing::debug!(
        "Recorded {} ({} links, {} new)",
        url,
        found,
        claimed
    );

    outcome.advance(UrlState::Recorded);
    outcome
}

/// Returns an unfetched URL to the queue because the run is stopping
fn interrupt(shared: &Shared, outcome: UrlOutcome) -> UrlOutcome {
    tracing::debug!("Crawl stopping, {} left unfetched", outcome.url);
    shared.frontier.requeue(outcome.url.clone());
    outcome
}
