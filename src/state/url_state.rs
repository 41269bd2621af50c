//! Per-URL crawl state definitions
//!
//! Every URL offered to the engine walks this machine exactly once:
//!
//! ```text
//! Pending -> Claimed -> Disallowed
//!                    -> Fetching -> FetchFailed
//!                                -> Fetched -> Extracted -> Recorded
//! Pending -> Duplicate
//! ```
use std::fmt;

/// Represents the current state of a URL within a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    // ===== Active States =====
    /// URL was found and is about to be offered to the frontier
    Pending,

    /// URL won the frontier claim and waits in the work queue
    Claimed,

    /// URL is being fetched
    Fetching,

    /// Response body arrived and awaits extraction
    Fetched,

    /// Page facts were extracted and await recording
    Extracted,

    // ===== Terminal States =====
    /// Site and images were recorded
    Recorded,

    /// robots.txt denies the URL
    Disallowed,

    /// Fetch failed (timeout, connection error, non-2xx status)
    FetchFailed,

    /// URL was already claimed earlier in the run
    Duplicate,
}

impl UrlState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Recorded | Self::Disallowed | Self::FetchFailed | Self::Duplicate
        )
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Recorded)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Claimed)
                | (Self::Pending, Self::Duplicate)
                | (Self::Claimed, Self::Disallowed)
                | (Self::Claimed, Self::Fetching)
                | (Self::Fetching, Self::FetchFailed)
                | (Self::Fetching, Self::Fetched)
                | (Self::Fetched, Self::Extracted)
                | (Self::Extracted, Self::Recorded)
        )
    }

    /// Short snake_case name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::Extracted => "extracted",
            Self::Recorded => "recorded",
            Self::Disallowed => "disallowed",
            Self::FetchFailed => "fetch_failed",
            Self::Duplicate => "duplicate",
        }
    }

    /// Returns all possible states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Claimed,
            Self::Fetching,
            Self::Fetched,
            Self::Extracted,
            Self::Recorded,
            Self::Disallowed,
            Self::FetchFailed,
            Self::Duplicate,
        ]
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
