// src/checker/orphans.rs
// =============================================================================
// Finds orphan pages: pages the crawl knows about (usually via the sitemap)
// that no other page links to.
//
//   orphans = all page URLs - every internal link target - the entry points
//
// The entry points are the crawl's start URL and the site root ("/"), since
// nobody is expected to link to them. A page linking only to itself still
// counts as an orphan.
//
// This is a pure function over the crawl result; no requests are made.
// =============================================================================

use std::collections::HashSet;
use url::Url;

use crate::crawl::urls::{canonicalize, origin_of};
use crate::crawl::Page;

/// URLs of pages that no other page links to, in discovery order.
///
/// `root_url` is the crawl's start URL; it and its site root are exempt.
pub fn find_orphans(pages: &[Page], root_url: &str) -> Vec<String> {
    let root = canonicalize(root_url).unwrap_or_else(|| root_url.to_string());
    let site_root = Url::parse(&root)
        .ok()
        .and_then(|parsed| origin_of(&parsed))
        .map(|origin| format!("{}/", origin));

    let referenced: HashSet<&str> = pages
        .iter()
        .flat_map(|page| {
            page.internal_links
                .iter()
                .filter(move |link| **link != page.url)
                .map(String::as_str)
        })
        .collect();

    pages
        .iter()
        .map(|page| page.url.as_str())
        .filter(|url| *url != root && Some(*url) != site_root.as_deref())
        .filter(|url| !referenced.contains(url))
        .map(str::to_string)
        .collect()
}
