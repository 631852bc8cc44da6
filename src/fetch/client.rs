// src/fetch/client.rs
// =============================================================================
// The reqwest-backed implementation of `Fetcher`.
//
// Two clients are kept:
// - `client` follows redirects on its own and is used for pages and documents
// - `probe_client` never follows redirects, so `probe` can walk the chain
//   itself and count every hop
//
// Probes use HEAD (no body download) and fall back to GET when a server
// refuses HEAD.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::{FetchError, FetchedPage, Fetcher, ProbeResponse};

// Upper bound for redirects when fetching pages for the crawl
const PAGE_REDIRECT_LIMIT: usize = 10;

/// HTTP fetcher shared by the crawl and the link checker.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    probe_client: Client,
}

impl HttpFetcher {
    /// Builds both clients with the given user agent.
    ///
    /// `timeout` bounds page and document fetches; probes carry their own
    /// timeout per call.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(Policy::limited(PAGE_REDIRECT_LIMIT))
            .build()?;

        let probe_client = Client::builder()
            .user_agent(user_agent)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { client, probe_client })
    }

    // One probe request without redirect handling.
    // HEAD first; 405 Method Not Allowed / 501 Not Implemented retry as GET.
    async fn probe_once(&self, url: &str, timeout: Duration) -> Result<Response, FetchError> {
        let response = self.probe_client.head(url).timeout(timeout).send().await?;

        if matches!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            debug!(url, "HEAD rejected, retrying with GET");
            let response = self.probe_client.get(url).timeout(timeout).send().await?;
            return Ok(response);
        }

        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            content_type,
            body,
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    async fn probe(
        &self,
        url: &str,
        timeout: Duration,
        max_redirects: usize,
    ) -> Result<ProbeResponse, FetchError> {
        let mut current = url.to_string();
        let mut hops = 0;

        loop {
            let response = self.probe_once(&current, timeout).await?;
            let status = response.status();

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            // A 3xx without a usable Location is reported as-is
            if let (true, Some(location)) = (status.is_redirection(), location) {
                let next = response.url().join(&location).map_err(|e| {
                    FetchError::Request(format!("Invalid redirect target '{}': {}", location, e))
                })?;

                if hops >= max_redirects {
                    return Err(FetchError::TooManyRedirects);
                }

                hops += 1;
                current = next.to_string();
                continue;
            }

            return Ok(ProbeResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                final_url: current,
                hops,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new("site-auditor-test", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_returns_body_and_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html><title>About</title></html>"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/about", server.uri());
        let page = fetcher().fetch_page(&url).await.unwrap();

        assert_eq!(page.final_url, url);
        assert!(!page.was_redirected());
        assert!(page.body.contains("About"));
        assert_eq!(page.content_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch_page(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Status(500));
    }

    #[tokio::test]
    async fn test_probe_reports_404() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let probe = fetcher()
            .probe(&format!("{}/gone", server.uri()), Duration::from_secs(2), 5)
            .await
            .unwrap();
        assert_eq!(probe.status, 404);
        assert_eq!(probe.status_text, "Not Found");
        assert_eq!(probe.hops, 0);
    }

    #[tokio::test]
    async fn test_probe_counts_redirect_hops() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/b"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/c"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/c"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let probe = fetcher()
            .probe(&format!("{}/a", server.uri()), Duration::from_secs(2), 5)
            .await
            .unwrap();
        assert_eq!(probe.status, 200);
        assert_eq!(probe.hops, 2);
        assert_eq!(probe.final_url, format!("{}/c", server.uri()));
    }

    #[tokio::test]
    async fn test_probe_redirect_loop_is_too_many_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
            .mount(&server)
            .await;

        let err = fetcher()
            .probe(&format!("{}/loop", server.uri()), Duration::from_secs(2), 3)
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::TooManyRedirects);
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_get() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let probe = fetcher()
            .probe(&format!("{}/no-head", server.uri()), Duration::from_secs(2), 5)
            .await
            .unwrap();
        assert_eq!(probe.status, 200);
    }

    #[tokio::test]
    async fn test_probe_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = fetcher()
            .probe(&format!("{}/slow", server.uri()), Duration::from_millis(100), 5)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}
