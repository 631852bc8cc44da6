// src/fetch/stub.rs
// In-memory `Fetcher` for tests: canned pages, documents and probe results,
// plus a log of every page request and probe made.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{FetchError, FetchedPage, Fetcher, ProbeResponse};

#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, Result<FetchedPage, FetchError>>,
    texts: HashMap<String, String>,
    probes: HashMap<String, Result<ProbeResponse, FetchError>>,
    requested: Mutex<Vec<String>>,
    probed: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_document(url, "text/html; charset=utf-8", html)
    }

    /// A successful fetch served with an arbitrary Content-Type.
    pub fn with_document(mut self, url: &str, content_type: &str, body: &str) -> Self {
        let page = FetchedPage {
            url: url.to_string(),
            final_url: url.to_string(),
            content_type: Some(content_type.to_string()),
            body: body.to_string(),
        };
        self.pages.insert(url.to_string(), Ok(page));
        self
    }

    pub fn with_page_error(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    pub fn with_text(mut self, url: &str, body: &str) -> Self {
        self.texts.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_probe(mut self, url: &str, status: u16, hops: usize, final_url: &str) -> Self {
        let probe = ProbeResponse {
            status,
            status_text: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("")
                .to_string(),
            final_url: final_url.to_string(),
            hops,
        };
        self.probes.insert(url.to_string(), Ok(probe));
        self
    }

    pub fn with_probe_error(mut self, url: &str, error: FetchError) -> Self {
        self.probes.insert(url.to_string(), Err(error));
        self
    }

    /// Page URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// URLs probed so far, in order.
    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.texts.get(url).cloned().ok_or(FetchError::Status(404))
    }

    async fn probe(
        &self,
        url: &str,
        _timeout: Duration,
        _max_redirects: usize,
    ) -> Result<ProbeResponse, FetchError> {
        self.probed.lock().unwrap().push(url.to_string());
        self.probes.get(url).cloned().unwrap_or_else(|| {
            Ok(ProbeResponse {
                status: 200,
                status_text: "OK".to_string(),
                final_url: url.to_string(),
                hops: 0,
            })
        })
    }
}
