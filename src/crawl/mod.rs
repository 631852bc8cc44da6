// src/crawl/mod.rs
// =============================================================================
// This module discovers a website's pages.
//
// Strategy (sitemap first):
// 1. Validate the seed URL and bounds (fail before any request)
// 2. Load robots.txt, or allow everything when it is missing or disabled
// 3. Try {origin}/sitemap.xml; if it lists pages, fetch each one once
// 4. Otherwise crawl recursively from the seed, following internal links
// 5. Package pages, errors and timings into a `CrawlResult`
//
// Submodules:
// - urls: normalization, canonical keys, same-domain checks
// - robots: robots.txt rules
// - sitemap: sitemap.xml lookup
// - extract: HTML -> Page
// - graph: Page, PageGraph, CrawlResult
// - queue: the recursive crawl
// - rate: delay between requests
// =============================================================================

pub mod extract;
pub mod graph;
pub mod queue;
pub mod rate;
pub mod robots;
pub mod sitemap;
pub mod urls;

pub use graph::{CrawlResult, Page};
pub use queue::{CrawlOutput, Crawler};
pub use rate::RateLimiter;
pub use robots::RobotsPolicy;
pub use sitemap::SitemapOutcome;

use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ConfigError, CrawlConfig};
use crate::fetch::Fetcher;

/// Builds the page graph for the site at `seed_url`.
///
/// Only configuration problems are errors. Everything that goes wrong per
/// page ends up in `CrawlResult::errors`.
pub async fn discover_site(
    seed_url: &str,
    config: &CrawlConfig,
    fetcher: &dyn Fetcher,
    limiter: &dyn RateLimiter,
) -> Result<CrawlResult, ConfigError> {
    config.validate()?;

    let seed = parse_seed(seed_url)?;
    let start_url = urls::canonicalize(seed.as_str())
        .ok_or_else(|| invalid_seed(seed_url, "not an http(s) URL"))?;
    let domain =
        urls::domain_label(&seed).ok_or_else(|| invalid_seed(seed_url, "URL has no host"))?;
    let origin =
        urls::origin_of(&seed).ok_or_else(|| invalid_seed(seed_url, "URL has no host"))?;

    let started = Instant::now();
    let timestamp = Utc::now();

    info!(url = %start_url, domain = %domain, "starting discovery");

    let policy = if config.respect_robots {
        load_robots(fetcher, &origin, config.robots_agent()).await
    } else {
        RobotsPolicy::permit_all()
    };

    let (output, sitemap_used) = match sitemap::resolve_sitemap(fetcher, &origin).await {
        SitemapOutcome::Available(listed) => {
            let output = fetch_listed(&listed, config.max_pages, fetcher, limiter, &policy).await;
            (output, true)
        }
        SitemapOutcome::Unavailable(reason) => {
            info!(reason = %reason, "no usable sitemap, crawling links instead");
            let crawler = Crawler {
                fetcher,
                limiter,
                policy: &policy,
                max_depth: config.max_depth,
                max_pages: config.max_pages,
            };
            (crawler.crawl(&start_url).await, false)
        }
    };

    if output.graph.is_empty() {
        warn!(url = %start_url, errors = output.errors.len(), "no pages could be fetched");
    }

    let pages = output.graph.into_pages();
    Ok(CrawlResult {
        domain,
        start_url,
        timestamp,
        total_pages: pages.len(),
        pages,
        sitemap_used,
        duration_ms: started.elapsed().as_millis() as u64,
        errors: output.errors,
    })
}

fn parse_seed(seed_url: &str) -> Result<Url, ConfigError> {
    let seed = Url::parse(seed_url).map_err(|e| invalid_seed(seed_url, &e.to_string()))?;
    if !matches!(seed.scheme(), "http" | "https") {
        return Err(invalid_seed(seed_url, "URL must be http or https"));
    }
    if seed.host_str().is_none() {
        return Err(invalid_seed(seed_url, "URL has no host"));
    }
    Ok(seed)
}

fn invalid_seed(url: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidSeedUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

// Any failure means "no rules"
async fn load_robots(fetcher: &dyn Fetcher, origin: &str, agent: &str) -> RobotsPolicy {
    let robots_url = format!("{}/robots.txt", origin);
    match fetcher.fetch_text(&robots_url).await {
        Ok(text) => {
            let policy = RobotsPolicy::parse(&text, agent);
            debug!(
                disallow = policy.disallow_patterns().count(),
                allow = policy.allow_patterns().count(),
                sitemap = policy.can_use_sitemap(),
                "loaded robots.txt"
            );
            policy
        }
        Err(e) => {
            warn!(url = %robots_url, error = %e, "robots.txt unavailable, allowing all paths");
            RobotsPolicy::permit_all()
        }
    }
}

// Sitemap path: every listed URL is fetched once, no link following.
async fn fetch_listed(
    listed_urls: &[String],
    max_pages: usize,
    fetcher: &dyn Fetcher,
    limiter: &dyn RateLimiter,
    policy: &RobotsPolicy,
) -> CrawlOutput {
    let mut output = CrawlOutput::default();

    for listed in listed_urls {
        if output.graph.len() >= max_pages {
            break;
        }

        let Some(key) = urls::canonicalize(listed) else {
            continue;
        };
        if output.graph.contains(&key) {
            continue;
        }

        let allowed = Url::parse(&key)
            .map(|parsed| policy.can_crawl(parsed.path()))
            .unwrap_or(false);
        if !allowed {
            debug!(url = %key, "disallowed by robots.txt");
            continue;
        }

        let fetched = queue::fetch_and_extract(fetcher, limiter, &key, &mut output.errors).await;
        if let Some(page) = fetched {
            output.graph.insert(page);
        }
    }

    info!(
        pages = output.graph.len(),
        errors = output.errors.len(),
        "sitemap pages fetched"
    );
    output
}
