//! Per-run crawl report

use crate::state::UrlState;
use std::collections::HashMap;
use std::time::Duration;

/// Outcome counts for one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Count of URLs per terminal state
    pub urls_by_state: HashMap<UrlState, u64>,

    /// Image URLs newly added during the run
    pub images_added: u64,

    /// URLs a worker had picked up but returned unfetched because the run stopped
    pub interrupted: u64,

    /// Whether the run stopped on cancellation rather than quiescence
    pub cancelled: bool,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Counts one URL reaching a terminal state
    pub fn count(&mut self, state: UrlState) {
        *self.urls_by_state.entry(state).or_insert(0) += 1;
    }

    /// Number of URLs that ended in `state`
    pub fn get(&self, state: UrlState) -> u64 {
        self.urls_by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn recorded(&self) -> u64 {
        self.get(UrlState::Recorded)
    }

    pub fn failed(&self) -> u64 {
        self.get(UrlState::FetchFailed)
    }

    pub fn disallowed(&self) -> u64 {
        self.get(UrlState::Disallowed)
    }

    pub fn duplicates(&self) -> u64 {
        self.get(UrlState::Duplicate)
    }

    /// Pages recorded per second of wall-clock time
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.recorded() as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints a run report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    let finish = if report.cancelled {
        "cancelled"
    } else {
        "queue drained"
    };
    println!("Finished: {} after {:.1?}", finish, report.elapsed);
    println!();

    println!("URLs by Outcome:");
    for state in UrlState::all_states()
        .into_iter()
        .filter(|s| s.is_terminal())
    {
        println!("  {}: {}", state, report.get(state));
    }
    if report.interrupted > 0 {
        println!("  returned unfetched: {}", report.interrupted);
    }
    println!();

    println!("Images added: {}", report.images_added);
    println!("Rate: {:.2} pages/sec", report.rate());
}
