//! Robots.txt policy evaluation built on the robotstxt crate

use robotstxt::DefaultMatcher;

/// User agent token whose group is evaluated
///
/// The crawler obeys the universal `User-agent: *` group only.
pub const UNIVERSAL_AGENT: &str = "*";

/// Parsed robots.txt data
///
/// Wraps the raw robots.txt body; an `allow_all` policy stands in for hosts
/// whose robots.txt could not be retrieved.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    /// Whether every URL is allowed regardless of content
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is the fail-open policy used when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true if this policy came from a fetch failure
    pub fn is_allow_all(&self) -> bool {
        self.allow_all
    }

    /// Checks if a URL is allowed for the universal user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The full URL (or path) to check
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, UNIVERSAL_AGENT, url)
    }
}
