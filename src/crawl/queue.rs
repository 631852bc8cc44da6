// src/crawl/queue.rs
// =============================================================================
// Recursive discovery of a site's pages, written as a loop over a work stack.
//
// How it works:
// 1. Push the seed URL onto the stack at depth 0
// 2. Pop a candidate; skip it if it is too deep, the graph is full, or the
//    URL was already tried
// 3. Skip it (silently) if it does not parse or robots.txt disallows its path
// 4. Wait for the rate limiter, then fetch and extract the page
// 5. Store the page and push its internal links at depth + 1
// 6. Repeat until the stack is empty
//
// Links are pushed in reverse so the first link on a page is explored first:
// the visiting order is depth-first in link order, the same as calling the
// crawl recursively for every link.
//
// Only internal links are ever pushed, so the crawl never leaves the domain.
// A failed fetch is written to the error log and the crawl moves on.
//
// Rust concepts:
// - Vec as a stack: push() and pop() on the same end
// - &dyn Trait: the fetcher and rate limiter are chosen by the caller
// =============================================================================

use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

use super::extract::extract_page;
use super::graph::{CrawlError, Page, PageGraph};
use super::rate::RateLimiter;
use super::robots::RobotsPolicy;
use crate::fetch::Fetcher;

// Represents a page waiting to be crawled
#[derive(Debug, Clone)]
struct CrawlItem {
    url: String,
    depth: usize, // Link hops from the seed
}

/// Everything the traversal needs besides the seed.
pub struct Crawler<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub limiter: &'a dyn RateLimiter,
    pub policy: &'a RobotsPolicy,
    pub max_depth: usize,
    pub max_pages: usize,
}

/// Pages and failures collected by a traversal.
#[derive(Debug, Default)]
pub struct CrawlOutput {
    pub graph: PageGraph,
    pub errors: Vec<CrawlError>,
}

impl Crawler<'_> {
    /// Crawls from `seed`, which must already be canonical.
    pub async fn crawl(&self, seed: &str) -> CrawlOutput {
        let mut output = CrawlOutput::default();
        // URLs we already tried to fetch, successful or not
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack = vec![CrawlItem {
            url: seed.to_string(),
            depth: 0,
        }];

        while let Some(item) = stack.pop() {
            if item.depth > self.max_depth
                || output.graph.len() >= self.max_pages
                || visited.contains(&item.url)
            {
                continue;
            }

            if !self.is_allowed(&item.url) {
                continue;
            }

            debug!(url = %item.url, depth = item.depth, "crawling");
            visited.insert(item.url.clone());

            let fetched =
                fetch_and_extract(self.fetcher, self.limiter, &item.url, &mut output.errors).await;
            let Some(page) = fetched else {
                continue;
            };

            // Reverse so the first link is popped first
            for link in page.internal_links.iter().rev() {
                if !visited.contains(link) {
                    stack.push(CrawlItem {
                        url: link.clone(),
                        depth: item.depth + 1,
                    });
                }
            }

            output.graph.insert(page);
        }

        info!(
            pages = output.graph.len(),
            noindex = output.graph.iter().filter(|p| !p.indexable).count(),
            errors = output.errors.len(),
            "crawl finished"
        );
        output
    }

    // Parse + robots check. Rejections are not errors.
    fn is_allowed(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(url, error = %e, "skipping unparseable URL");
                return false;
            }
        };

        if !self.policy.can_crawl(parsed.path()) {
            debug!(url, "disallowed by robots.txt");
            return false;
        }

        true
    }
}

/// Waits for the limiter, fetches `url` and extracts it.
///
/// A failed fetch is appended to `errors` and yields None. So does nothing
/// else: a body that is not HTML (a PDF, an image) is dropped without being
/// treated as a page or as an error.
pub(crate) async fn fetch_and_extract(
    fetcher: &dyn Fetcher,
    limiter: &dyn RateLimiter,
    url: &str,
    errors: &mut Vec<CrawlError>,
) -> Option<Page> {
    limiter.wait().await;

    match fetcher.fetch_page(url).await {
        Ok(fetched) => {
            if fetched.was_redirected() {
                debug!(url, final_url = %fetched.final_url, "redirected");
            }
            if !fetched.is_html() {
                debug!(url, content_type = ?fetched.content_type, "not HTML, skipping");
                return None;
            }
            Some(extract_page(url, &fetched.final_url, &fetched.body))
        }
        Err(e) => {
            warn!(url, error = %e, "failed to fetch page");
            errors.push(CrawlError::new(url, e.to_string()));
            None
        }
    }
}
