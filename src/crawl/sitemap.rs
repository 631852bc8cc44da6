// src/crawl/sitemap.rs
// =============================================================================
// Sitemap-first discovery.
//
// We fetch {origin}/sitemap.xml and read every <loc> inside <url> entries of a
// <urlset>. Only URLs on the same host as the sitemap are kept.
//
// Any problem (network error, non-2xx, malformed XML, no usable entries) is
// reported as `SitemapOutcome::Unavailable` with a reason, which tells the
// caller to fall back to link-following. It is never an error.
// =============================================================================

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info};

use super::urls::same_domain;
use crate::fetch::Fetcher;

/// What the sitemap lookup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapOutcome {
    /// Same-domain page URLs in document order (never empty)
    Available(Vec<String>),
    /// No usable sitemap; the reason is for logging
    Unavailable(String),
}

/// Fetches and parses `{origin}/sitemap.xml`.
pub async fn resolve_sitemap(fetcher: &dyn Fetcher, origin: &str) -> SitemapOutcome {
    let sitemap_url = format!("{}/sitemap.xml", origin.trim_end_matches('/'));
    debug!(url = %sitemap_url, "fetching sitemap");

    let xml = match fetcher.fetch_text(&sitemap_url).await {
        Ok(xml) => xml,
        Err(e) => return SitemapOutcome::Unavailable(format!("fetch failed: {}", e)),
    };

    let locations = match parse_urlset(&xml) {
        Ok(locations) => locations,
        Err(reason) => return SitemapOutcome::Unavailable(reason),
    };

    let total = locations.len();
    let mut urls: Vec<String> = Vec::new();
    for loc in locations {
        if same_domain(&loc, &sitemap_url) && !urls.contains(&loc) {
            urls.push(loc);
        }
    }

    if urls.is_empty() {
        return SitemapOutcome::Unavailable(format!(
            "none of {} sitemap entries are on this domain",
            total
        ));
    }

    info!(url = %sitemap_url, count = urls.len(), "sitemap found");
    SitemapOutcome::Available(urls)
}

// Reads <loc> values of <url> entries in a <urlset>.
// Sitemap index files and anything without <url> entries are rejected.
fn parse_urlset(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut saw_urlset = false;
    let mut in_url = false;
    let mut in_loc = false;
    let mut locations = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"urlset" => saw_urlset = true,
                b"url" if saw_urlset => in_url = true,
                b"loc" if in_url => in_loc = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"url" => in_url = false,
                b"loc" => in_loc = false,
                _ => {}
            },
            Ok(Event::Text(t)) if in_loc => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("malformed sitemap: {}", e))?;
                let text = text.trim();
                if !text.is_empty() {
                    locations.push(text.to_string());
                }
            }
            Ok(Event::CData(t)) if in_loc => {
                let text = String::from_utf8_lossy(&t).trim().to_string();
                if !text.is_empty() {
                    locations.push(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("malformed sitemap: {}", e)),
            _ => {}
        }
    }

    if !saw_urlset {
        return Err("no <urlset> element".to_string());
    }
    if locations.is_empty() {
        return Err("no <url> entries".to_string());
    }

    Ok(locations)
}
