//! Configuration module for Linkwalker
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use linkwalker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkwalker.toml")).unwrap();
//! println!("Crawling from {} seeds", config.crawler.seed_urls.len());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, EventsConfig, OutputConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_output_config, MAX_WORKERS};
