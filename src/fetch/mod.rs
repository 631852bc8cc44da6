// src/fetch/mod.rs
// =============================================================================
// This module is the network boundary of the auditor.
//
// Everything that talks HTTP goes through the `Fetcher` trait:
// - fetch_page: GET a page (redirects followed) for crawling
// - fetch_text: GET a plain document such as robots.txt or sitemap.xml
// - probe: a lightweight existence check used by the link-health checker
//
// The crawler and link checker only ever see `&dyn Fetcher`, so tests can
// swap in an in-memory stub while the binary uses `HttpFetcher` (reqwest).
//
// Rust concepts:
// - Traits: A shared interface with several implementations
// - async-trait: Lets a trait have async methods and still be used as `dyn`
// - thiserror: Derives std::error::Error for our error enum
// =============================================================================

mod client;
#[cfg(test)]
pub mod stub;

pub use client::HttpFetcher;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A page fetched for crawling.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL we asked for
    pub url: String,
    /// URL we ended up at after redirects
    pub final_url: String,
    /// Value of the Content-Type header, if any
    pub content_type: Option<String>,
    /// Raw response body
    pub body: String,
}

impl FetchedPage {
    /// True when the server redirected us somewhere else
    pub fn was_redirected(&self) -> bool {
        self.url != self.final_url
    }

    /// True unless the server said the body is something other than HTML.
    /// A missing Content-Type is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(content_type) => {
                let mime = content_type.to_ascii_lowercase();
                mime.contains("text/html") || mime.contains("application/xhtml")
            }
            None => true,
        }
    }
}

/// Outcome of a lightweight existence probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub status_text: String,
    pub final_url: String,
    /// Number of redirects followed before the final response
    pub hops: usize,
}

/// Everything that can go wrong while talking to a server.
///
/// These are recorded as data by the crawler and link checker; they never
/// abort a whole run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("{0}")]
    Request(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout)
    }
}

impl From<reqwest::Error> for FetchError {
    // Mirrors how reqwest reports failures: timeout first, then redirect
    // loops, then connection problems, everything else as a plain message.
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

/// The network capability consumed by the crawl and the link checker.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a page, following redirects. Non-2xx is an error.
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// GET a text document (robots.txt, sitemap.xml). Non-2xx is an error.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Check that a URL exists without downloading it.
    ///
    /// Redirects are followed up to `max_redirects`; the returned status is
    /// the one of the last response in the chain, whatever it is.
    async fn probe(
        &self,
        url: &str,
        timeout: Duration,
        max_redirects: usize,
    ) -> Result<ProbeResponse, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_type(content_type: Option<&str>) -> FetchedPage {
        FetchedPage {
            url: "https://example.com/".to_string(),
            final_url: "https://example.com/".to_string(),
            content_type: content_type.map(str::to_string),
            body: String::new(),
        }
    }

    #[test]
    fn test_is_html() {
        assert!(page_with_type(Some("text/html")).is_html());
        assert!(page_with_type(Some("Text/HTML; charset=UTF-8")).is_html());
        assert!(page_with_type(Some("application/xhtml+xml")).is_html());
        assert!(page_with_type(None).is_html());

        assert!(!page_with_type(Some("application/pdf")).is_html());
        assert!(!page_with_type(Some("image/png")).is_html());
    }
}
