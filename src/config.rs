// src/config.rs
// =============================================================================
// Run configuration for the crawl and the link-health checker.
//
// The CLI (src/cli.rs) fills these structs in; `validate()` is called before
// any network activity so a bad bound fails fast.
//
// Rust concepts:
// - Default trait: sensible values when a flag is omitted
// - thiserror: a typed error enum for configuration problems
// - RangeInclusive: `(1..=10).contains(&x)` for bound checks
// =============================================================================

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

pub const MAX_DEPTH_RANGE: RangeInclusive<usize> = 1..=10;
pub const MAX_PAGES_RANGE: RangeInclusive<usize> = 1..=500;

pub const DEFAULT_USER_AGENT: &str = concat!("site-auditor/", env!("CARGO_PKG_VERSION"));

/// Errors that stop an operation before any request is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeedUrl { url: String, reason: String },

    #[error("max_depth must be between {} and {}, got {0}", MAX_DEPTH_RANGE.start(), MAX_DEPTH_RANGE.end())]
    MaxDepthOutOfRange(usize),

    #[error("max_pages must be between {} and {}, got {0}", MAX_PAGES_RANGE.start(), MAX_PAGES_RANGE.end())]
    MaxPagesOutOfRange(usize),

    #[error("No links to check")]
    NoLinksToCheck,
}

/// Settings for discovering a site's page graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrawlConfig {
    pub max_depth: usize,
    pub max_pages: usize,
    /// Honour robots.txt allow/disallow rules
    pub respect_robots: bool,
    /// Delay before every page fetch
    pub rate_limit_ms: u64,
    /// Timeout for page, robots and sitemap fetches
    pub request_timeout_ms: u64,
    /// Sent as User-Agent; its product token picks the robots.txt block
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 50,
            respect_robots: true,
            rate_limit_ms: 500,
            request_timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !MAX_DEPTH_RANGE.contains(&self.max_depth) {
            return Err(ConfigError::MaxDepthOutOfRange(self.max_depth));
        }
        if !MAX_PAGES_RANGE.contains(&self.max_pages) {
            return Err(ConfigError::MaxPagesOutOfRange(self.max_pages));
        }
        Ok(())
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The name robots.txt blocks use for us: the User-Agent up to the
    /// first '/' or space ("site-auditor/0.1.0" -> "site-auditor").
    pub fn robots_agent(&self) -> &str {
        self.user_agent
            .split(['/', ' '])
            .next()
            .unwrap_or(&self.user_agent)
    }
}

/// Settings for the link-health checker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkCheckConfig {
    /// Also probe links that leave the site
    pub include_external: bool,
    pub rate_limit_ms: u64,
    pub internal_timeout_ms: u64,
    pub external_timeout_ms: u64,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for LinkCheckConfig {
    fn default() -> Self {
        Self {
            include_external: false,
            rate_limit_ms: 500,
            internal_timeout_ms: 5_000,
            external_timeout_ms: 10_000,
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl LinkCheckConfig {
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn internal_timeout(&self) -> Duration {
        Duration::from_millis(self.internal_timeout_ms)
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_millis(self.external_timeout_ms)
    }
}
