// src/crawl/graph.rs
// =============================================================================
// The data produced by a crawl.
//
// - Page: one fetched URL with its extracted facts and outgoing links
// - PageGraph: pages keyed by canonical URL, in discovery order
// - CrawlError: a failed fetch (url, message, timestamp)
// - CrawlResult: the final snapshot written to disk for the other commands
//
// A page only enters the graph after a successful fetch + parse, and a URL is
// never inserted twice: the first page seen for a key wins.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Open Graph and Twitter card fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialTags {
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub twitter_card: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub twitter_image: Option<String>,
}

/// Heading text in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

/// One discovered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Canonical URL; the page's identity within a crawl
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub social: SocialTags,
    pub headings: Headings,
    pub word_count: usize,
    /// False when a robots meta tag says "noindex"
    pub indexable: bool,
    /// Same-host link targets, canonical and unique
    pub internal_links: Vec<String>,
    /// Other-host link targets, canonical and unique
    pub external_links: Vec<String>,
}

/// Pages keyed by canonical URL, remembering insertion order.
#[derive(Debug, Default)]
pub struct PageGraph {
    pages: Vec<Page>,
    index: HashMap<String, usize>,
}

impl PageGraph {
    /// Inserts `page` unless its URL is already present.
    ///
    /// Returns false (and drops `page`) when the key already exists.
    pub fn insert(&mut self, page: Page) -> bool {
        if self.index.contains_key(&page.url) {
            return false;
        }
        self.index.insert(page.url.clone(), self.pages.len());
        self.pages.push(page);
        true
    }

    pub fn get(&self, url: &str) -> Option<&Page> {
        self.index.get(url).map(|&i| &self.pages[i])
    }

    pub fn contains(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

/// A failed fetch during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlError {
    pub url: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl CrawlError {
    pub fn new(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The hand-off artifact read by `links`, `orphans` and any other analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Seed host without a leading "www."
    pub domain: String,
    pub start_url: String,
    pub timestamp: DateTime<Utc>,
    pub pages: Vec<Page>,
    pub sitemap_used: bool,
    pub total_pages: usize,
    pub duration_ms: u64,
    pub errors: Vec<CrawlError>,
}

impl CrawlResult {
    /// Writes the result as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize crawl result")?;
        std::fs::write(path, json)
            .with_context(|| format!("write crawl result: {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read crawl result: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("parse crawl result: {}", path.display()))
    }
}

#[cfg(test)]
pub(crate) fn page_with_links(url: &str, internal: &[&str], external: &[&str]) -> Page {
    Page {
        url: url.to_string(),
        title: None,
        description: None,
        canonical: None,
        social: SocialTags::default(),
        headings: Headings::default(),
        word_count: 0,
        indexable: true,
        internal_links: internal.iter().map(|s| s.to_string()).collect(),
        external_links: external.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_wins() {
        let mut graph = PageGraph::default();
        assert!(graph.insert(page_with_links("https://example.com/", &["https://example.com/a"], &[])));
        assert!(!graph.insert(page_with_links("https://example.com/", &[], &[])));

        assert_eq!(graph.len(), 1);
        let page = graph.get("https://example.com/").unwrap();
        assert_eq!(page.internal_links, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_iteration_keeps_discovery_order() {
        let mut graph = PageGraph::default();
        for url in ["https://example.com/c", "https://example.com/a", "https://example.com/b"] {
            graph.insert(page_with_links(url, &[], &[]));
        }
        let urls: Vec<_> = graph.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://example.com/c", "https://example.com/a", "https://example.com/b"]
        );
        assert!(graph.contains("https://example.com/a"));
        assert!(!graph.contains("https://example.com/d"));
    }

    #[test]
    fn test_crawl_result_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl-result.json");

        let result = CrawlResult {
            domain: "example.com".to_string(),
            start_url: "https://example.com/".to_string(),
            timestamp: Utc::now(),
            pages: vec![page_with_links("https://example.com/", &[], &["https://rust-lang.org/"])],
            sitemap_used: false,
            total_pages: 1,
            duration_ms: 12,
            errors: vec![CrawlError::new("https://example.com/broken", "HTTP 500")],
        };
        result.save(&path).unwrap();

        let loaded = CrawlResult::load(&path).unwrap();
        assert_eq!(loaded.pages, result.pages);
        assert_eq!(loaded.errors, result.errors);
        assert_eq!(loaded.domain, "example.com");
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = CrawlResult::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("read crawl result"));
    }
}
