// src/crawl/extract.rs
// =============================================================================
// Turns a fetched HTML document into a `Page`.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
//
// Extracted facts: title, meta description, canonical link, Open Graph and
// Twitter card tags, h1/h2/h3 text, visible word count, robots "noindex".
//
// Every <a href> is resolved against the page, made canonical and sorted into
// internal (same host as the requested URL) or external links.
// =============================================================================

use scraper::{ElementRef, Html, Selector};

use super::graph::{Headings, Page, SocialTags};
use super::urls::{canonicalize, is_http_url, normalize, same_domain};

// Tags whose text is not visible page content
const INVISIBLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Builds a `Page` for `url` from its HTML.
///
/// `url` is the canonical URL we requested; it becomes the page's key and
/// decides which links count as internal. `base_url` is where the response
/// actually came from and is used to resolve relative links.
pub fn extract_page(url: &str, base_url: &str, html: &str) -> Page {
    let document = Html::parse_document(html);
    let (internal_links, external_links) = extract_links(&document, url, base_url);

    Page {
        url: url.to_string(),
        title: first_text(&document, "title"),
        description: meta_content(&document, "description"),
        canonical: canonical_link(&document, base_url),
        social: SocialTags {
            og_title: meta_content(&document, "og:title"),
            og_description: meta_content(&document, "og:description"),
            og_image: meta_content(&document, "og:image"),
            twitter_card: meta_content(&document, "twitter:card"),
            twitter_title: meta_content(&document, "twitter:title"),
            twitter_description: meta_content(&document, "twitter:description"),
            twitter_image: meta_content(&document, "twitter:image"),
        },
        headings: Headings {
            h1: all_text(&document, "h1"),
            h2: all_text(&document, "h2"),
            h3: all_text(&document, "h3"),
        },
        word_count: count_words(&document),
        indexable: !is_noindex(&document),
        internal_links,
        external_links,
    }
}

// Selector::parse only fails on invalid CSS. All callers pass string
// literals, so a failure here is a programmer error.
fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

fn extract_links(document: &Html, url: &str, base_url: &str) -> (Vec<String>, Vec<String>) {
    let mut internal = Vec::new();
    let mut external = Vec::new();

    for element in document.select(&selector("a[href]")) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let resolved = normalize(href, Some(base_url));
        if !is_http_url(&resolved) {
            continue;
        }
        let Some(link) = canonicalize(&resolved) else {
            continue;
        };

        let bucket = if same_domain(&link, url) {
            &mut internal
        } else {
            &mut external
        };
        if !bucket.contains(&link) {
            bucket.push(link);
        }
    }

    (internal, external)
}

// Element text with runs of whitespace collapsed
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    document
        .select(&selector(css))
        .map(element_text)
        .find(|text| !text.is_empty())
}

fn all_text(document: &Html, css: &str) -> Vec<String> {
    document
        .select(&selector(css))
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

// <meta name=".."> or <meta property=".."> content, names compared
// case-insensitively
fn meta_content(document: &Html, key: &str) -> Option<String> {
    document.select(&selector("meta[content]")).find_map(|meta| {
        let element = meta.value();
        let name = element.attr("name").or_else(|| element.attr("property"))?;
        if !name.trim().eq_ignore_ascii_case(key) {
            return None;
        }
        let content = element.attr("content")?.trim();
        (!content.is_empty()).then(|| content.to_string())
    })
}

fn canonical_link(document: &Html, base_url: &str) -> Option<String> {
    document
        .select(&selector("link[rel][href]"))
        .find(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("canonical")))
        })
        .and_then(|link| link.value().attr("href"))
        .map(|href| normalize(href, Some(base_url)))
}

fn is_noindex(document: &Html) -> bool {
    meta_content(document, "robots")
        .map(|content| content.to_ascii_lowercase().contains("noindex"))
        .unwrap_or(false)
}

fn count_words(document: &Html) -> usize {
    let root = document
        .select(&selector("body"))
        .next()
        .unwrap_or_else(|| document.root_element());

    root.descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| INVISIBLE_TAGS.contains(&e.name()))
            })
        })
        .map(|(_, text)| text.split_whitespace().count())
        .sum()
}
