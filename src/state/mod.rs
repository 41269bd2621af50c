//! State module for tracking crawl progress
//!
//! `UrlState` describes where a single URL is in its lifecycle, from being
//! offered to the frontier until it is recorded, disallowed or failed.

mod url_state;

pub use url_state::UrlState;
