//! Output module for crawl reports and statistics
//!
//! This module handles:
//! - Summarizing the outcome of a single run
//! - Summarizing everything recorded in the result store

mod report;
pub mod stats;

pub use report::{print_report, CrawlReport};
pub use stats::{load_statistics, print_statistics, StoreStatistics};
