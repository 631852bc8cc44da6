// src/checker/http.rs
// =============================================================================
// This module checks whether the links found during a crawl still work.
//
// Key functionality:
// - Collects every internal link in the crawl (and external ones on request)
// - Probes each URL with a lightweight request (see Fetcher::probe)
// - Classifies the result: working (200-399), broken, timed out, or errored
// - Counts redirect hops and flags long redirect chains
//
// Checks run one at a time with the same rate limit as the crawl. A failing
// link never stops the batch; it is just reported.
//
// Rust concepts:
// - Enums: To represent the different link outcomes
// - Instant: To measure response times
// - HashSet: To check each URL only once
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, LinkCheckConfig};
use crate::crawl::{Page, RateLimiter};
use crate::fetch::{FetchError, Fetcher, ProbeResponse};

/// Redirect chains longer than this are reported as long chains
pub const SHORT_CHAIN_MAX_HOPS: usize = 2;

/// How a link check ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    /// Final status in 200..400
    Working,
    /// Server answered with some other status
    Broken,
    /// No answer before the timeout
    Timeout,
    /// Connection, TLS, redirect-loop or other request failure
    Error,
}

/// Result of checking a single link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStatus {
    pub url: String,
    /// Final HTTP status, 0 when there was no response
    pub status: u16,
    pub status_text: String,
    pub working: bool,
    pub outcome: LinkOutcome,
    /// Where the redirects ended, if the URL redirected at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    /// Number of redirect hops followed
    pub redirect_chain: usize,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The link points to another domain
    pub external: bool,
}

impl LinkStatus {
    /// Helper method to check if the link is OK
    pub fn is_ok(&self) -> bool {
        self.working
    }

    pub fn is_long_chain(&self) -> bool {
        self.redirect_chain > SHORT_CHAIN_MAX_HOPS
    }
}

/// Tallies over all checked links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSummary {
    pub not_found: usize,
    pub timeouts: usize,
    pub errors: usize,
    pub long_redirect_chains: usize,
}

/// Everything the link checker found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokenLinkResult {
    pub checked_at: DateTime<Utc>,
    pub include_external: bool,
    pub total_checked: usize,
    pub working: usize,
    pub broken: Vec<LinkStatus>,
    /// Working links that went through at least one redirect
    pub redirected: Vec<LinkStatus>,
    pub summary: LinkSummary,
}

impl BrokenLinkResult {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize link report")?;
        std::fs::write(path, json)
            .with_context(|| format!("write link report: {}", path.display()))?;
        Ok(())
    }
}

/// Checks every link referenced by `pages`.
///
/// Fails only when there is nothing to check.
pub async fn check_links(
    pages: &[Page],
    config: &LinkCheckConfig,
    fetcher: &dyn Fetcher,
    limiter: &dyn RateLimiter,
) -> Result<BrokenLinkResult, ConfigError> {
    let targets = collect_targets(pages, config.include_external);
    if targets.is_empty() {
        return Err(ConfigError::NoLinksToCheck);
    }

    info!(
        links = targets.len(),
        include_external = config.include_external,
        "checking links"
    );

    let mut statuses = Vec::with_capacity(targets.len());
    for (url, external) in targets {
        limiter.wait().await;
        let status = check_single_link(fetcher, config, &url, external).await;

        if status.is_ok() {
            debug!(url = %status.url, status = status.status, "link ok");
        } else {
            warn!(url = %status.url, status = status.status, outcome = ?status.outcome, "broken link");
        }
        statuses.push(status);
    }

    Ok(summarize(statuses, config.include_external))
}

// Unique link targets in first-seen order, tagged with "is external"
fn collect_targets(pages: &[Page], include_external: bool) -> Vec<(String, bool)> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for page in pages {
        for link in &page.internal_links {
            if seen.insert(link.as_str()) {
                targets.push((link.clone(), false));
            }
        }
    }

    if include_external {
        for page in pages {
            for link in &page.external_links {
                if seen.insert(link.as_str()) {
                    targets.push((link.clone(), true));
                }
            }
        }
    }

    targets
}

async fn check_single_link(
    fetcher: &dyn Fetcher,
    config: &LinkCheckConfig,
    url: &str,
    external: bool,
) -> LinkStatus {
    let timeout = if external {
        config.external_timeout()
    } else {
        config.internal_timeout()
    };

    let started = Instant::now();
    let result = fetcher.probe(url, timeout, config.max_redirects).await;
    let response_time_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(probe) => analyze_response(url, external, probe, response_time_ms),
        Err(e) => categorize_error(url, external, e, timeout.as_millis() as u64, response_time_ms),
    }
}

// Any final status in 200..400 counts as working
fn analyze_response(url: &str, external: bool, probe: ProbeResponse, response_time_ms: u64) -> LinkStatus {
    let working = (200..400).contains(&probe.status);
    let redirect_to = (probe.final_url != url).then_some(probe.final_url);

    LinkStatus {
        url: url.to_string(),
        status: probe.status,
        status_text: probe.status_text,
        working,
        outcome: if working {
            LinkOutcome::Working
        } else {
            LinkOutcome::Broken
        },
        redirect_to,
        redirect_chain: probe.hops,
        response_time_ms,
        error: None,
        external,
    }
}

fn categorize_error(
    url: &str,
    external: bool,
    error: FetchError,
    timeout_ms: u64,
    response_time_ms: u64,
) -> LinkStatus {
    let (outcome, status_text, message) = if error.is_timeout() {
        (
            LinkOutcome::Timeout,
            "Timeout",
            format!("Request timed out after {}ms", timeout_ms),
        )
    } else {
        (LinkOutcome::Error, "Error", error.to_string())
    };

    LinkStatus {
        url: url.to_string(),
        status: 0,
        status_text: status_text.to_string(),
        working: false,
        outcome,
        redirect_to: None,
        redirect_chain: 0,
        response_time_ms,
        error: Some(message),
        external,
    }
}

fn summarize(statuses: Vec<LinkStatus>, include_external: bool) -> BrokenLinkResult {
    let mut summary = LinkSummary::default();
    let mut working = 0;
    let mut broken = Vec::new();
    let mut redirected = Vec::new();
    let total_checked = statuses.len();

    for status in statuses {
        if status.is_long_chain() {
            summary.long_redirect_chains += 1;
        }
        match status.outcome {
            LinkOutcome::Timeout => summary.timeouts += 1,
            LinkOutcome::Error => summary.errors += 1,
            LinkOutcome::Broken if status.status == 404 => summary.not_found += 1,
            _ => {}
        }

        if status.working {
            working += 1;
            if status.redirect_chain > 0 {
                redirected.push(status);
            }
        } else {
            broken.push(status);
        }
    }

    BrokenLinkResult {
        checked_at: Utc::now(),
        include_external,
        total_checked,
        working,
        broken,
        redirected,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::graph::page_with_links;
    use crate::crawl::rate::{CountingLimiter, NoDelay};
    use crate::fetch::stub::StubFetcher;

    fn config() -> LinkCheckConfig {
        LinkCheckConfig {
            rate_limit_ms: 0,
            ..LinkCheckConfig::default()
        }
    }

    fn pages() -> Vec<Page> {
        vec![
            page_with_links(
                "https://example.com/",
                &["https://example.com/a", "https://example.com/missing"],
                &["https://rust-lang.org/"],
            ),
            page_with_links(
                "https://example.com/a",
                &["https://example.com/", "https://example.com/missing", "https://example.com/slow"],
                &["https://rust-lang.org/", "https://dead.example.org/"],
            ),
        ]
    }

    #[tokio::test]
    async fn test_404_is_broken() {
        let fetcher = StubFetcher::new().with_probe(
            "https://example.com/missing",
            404,
            0,
            "https://example.com/missing",
        );
        let result = check_links(&pages(), &config(), &fetcher, &NoDelay).await.unwrap();

        let missing = result
            .broken
            .iter()
            .find(|s| s.url == "https://example.com/missing")
            .unwrap();
        assert_eq!(missing.status, 404);
        assert_eq!(missing.outcome, LinkOutcome::Broken);
        assert!(!missing.working);
        assert_eq!(result.summary.not_found, 1);
        assert_eq!(result.summary.timeouts, 0);
    }

    #[tokio::test]
    async fn test_timeout_is_tallied_separately() {
        let fetcher = StubFetcher::new()
            .with_probe_error("https://example.com/slow", FetchError::Timeout);
        let result = check_links(&pages(), &config(), &fetcher, &NoDelay).await.unwrap();

        let slow = result
            .broken
            .iter()
            .find(|s| s.url == "https://example.com/slow")
            .unwrap();
        assert_eq!(slow.status, 0);
        assert_eq!(slow.outcome, LinkOutcome::Timeout);
        assert!(slow.error.as_deref().unwrap().contains("timed out"));
        assert_eq!(result.summary.timeouts, 1);
        assert_eq!(result.summary.not_found, 0);
    }

    #[tokio::test]
    async fn test_internal_only_by_default() {
        let fetcher = StubFetcher::new();
        let result = check_links(&pages(), &config(), &fetcher, &NoDelay).await.unwrap();

        // /, /a, /missing, /slow -- each once
        assert_eq!(result.total_checked, 4);
        assert_eq!(result.working, 4);
        assert!(result.broken.is_empty());
        assert!(!result.include_external);
    }

    #[tokio::test]
    async fn test_include_external() {
        let fetcher = StubFetcher::new().with_probe_error(
            "https://dead.example.org/",
            FetchError::Connect("dns error".to_string()),
        );
        let config = LinkCheckConfig {
            include_external: true,
            ..config()
        };
        let result = check_links(&pages(), &config, &fetcher, &NoDelay).await.unwrap();

        assert_eq!(result.total_checked, 6);
        assert_eq!(result.broken.len(), 1);
        let dead = &result.broken[0];
        assert!(dead.external);
        assert_eq!(dead.outcome, LinkOutcome::Error);
        assert_eq!(dead.status, 0);
        assert_eq!(result.summary.errors, 1);
    }

    #[tokio::test]
    async fn test_redirect_chains() {
        let fetcher = StubFetcher::new()
            .with_probe("https://example.com/a", 200, 1, "https://example.com/a/")
            .with_probe("https://example.com/slow", 200, 3, "https://example.com/finally");
        let result = check_links(&pages(), &config(), &fetcher, &NoDelay).await.unwrap();

        assert_eq!(result.redirected.len(), 2);
        let short = result.redirected.iter().find(|s| s.url == "https://example.com/a").unwrap();
        assert_eq!(short.redirect_to.as_deref(), Some("https://example.com/a/"));
        assert_eq!(short.redirect_chain, 1);
        assert!(!short.is_long_chain());
        assert_eq!(result.summary.long_redirect_chains, 1);
    }

    #[tokio::test]
    async fn test_redirect_to_error_page_is_broken() {
        let fetcher = StubFetcher::new().with_probe(
            "https://example.com/a",
            410,
            1,
            "https://example.com/gone",
        );
        let result = check_links(&pages(), &config(), &fetcher, &NoDelay).await.unwrap();
        let a = result.broken.iter().find(|s| s.url == "https://example.com/a").unwrap();
        assert_eq!(a.status, 410);
        assert_eq!(a.redirect_chain, 1);
    }

    #[tokio::test]
    async fn test_no_links_is_an_error() {
        let fetcher = StubFetcher::new();
        let pages = vec![page_with_links("https://example.com/", &[], &["https://rust-lang.org/"])];
        let err = check_links(&pages, &config(), &fetcher, &NoDelay).await.unwrap_err();
        assert_eq!(err, ConfigError::NoLinksToCheck);
    }

    #[tokio::test]
    async fn test_limiter_waits_before_every_probe() {
        let fetcher = StubFetcher::new()
            .with_probe_error("https://example.com/slow", FetchError::Timeout)
            .with_probe_error(
                "https://dead.example.org/",
                FetchError::Connect("dns error".to_string()),
            );
        let config = LinkCheckConfig {
            include_external: true,
            ..config()
        };
        let limiter = CountingLimiter::default();
        let result = check_links(&pages(), &config, &fetcher, &limiter).await.unwrap();

        assert_eq!(fetcher.probed().len(), 6);
        assert_eq!(limiter.waits(), fetcher.probed().len());
        assert_eq!(result.total_checked, 6);
    }

    #[test]
    fn test_link_result_is_ok() {
        let ok = analyze_response(
            "https://example.com",
            false,
            ProbeResponse {
                status: 204,
                status_text: "No Content".to_string(),
                final_url: "https://example.com".to_string(),
                hops: 0,
            },
            5,
        );
        assert!(ok.is_ok());
        assert_eq!(ok.redirect_to, None);

        let broken = categorize_error("https://example.com", false, FetchError::TooManyRedirects, 5000, 12);
        assert!(!broken.is_ok());
        assert_eq!(broken.error.as_deref(), Some("Too many redirects"));
    }
}
