//! URL handling module for Linkwalker
//!
//! This module provides URL validation, relative reference resolution, and
//! the host helpers used by the robots.txt gate.

mod domain;
mod resolve;

pub use domain::{host_key, robots_url};
pub use resolve::{absolute_http_url, parse_crawl_url, resolve_against};
