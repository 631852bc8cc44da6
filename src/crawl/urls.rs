// src/crawl/urls.rs
// =============================================================================
// URL helpers used everywhere in the crawl:
// - normalize: resolve an href against the page it was found on
// - canonicalize: the identity key used for dedup (fragment dropped)
// - same_domain: the domain scope filter (exact host equality)
// - domain_label: the crawl's target domain, with a leading "www." removed
//
// None of these ever fail loudly. A result that is not an absolute http(s)
// URL simply means "skip this link".
//
// Rust concepts:
// - Option<T>: for "there may be no usable value"
// - The url crate: Url::parse and Url::join follow browser resolution rules
// =============================================================================

use url::Url;

/// Resolves `href` against `base` the way a browser would.
///
/// - absolute http(s) URLs come back unchanged
/// - `/path` replaces the base path entirely
/// - `#frag` and `?query` are appended verbatim to the base
/// - anything else is joined against the base's directory
///
/// When something cannot be parsed the input is returned as-is; callers use
/// `is_http_url` to decide whether the result is usable.
pub fn normalize(href: &str, base: Option<&str>) -> String {
    let href = href.trim();

    if is_http_url(href) {
        return href.to_string();
    }

    let Some(base) = base else {
        return href.to_string();
    };

    let base_url = match Url::parse(base) {
        Ok(url) => url,
        Err(_) => return href.to_string(),
    };

    if href.starts_with('#') || href.starts_with('?') {
        return format!("{}{}", base, href);
    }

    // "//host/path" is protocol-relative, not root-relative
    if href.starts_with('/') && !href.starts_with("//") {
        if let Some(origin) = origin_of(&base_url) {
            return format!("{}{}", origin, href);
        }
        return href.to_string();
    }

    match base_url.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Identity key for a URL: parsed, fragment removed.
///
/// Returns None for anything that is not an absolute http(s) URL.
pub fn canonicalize(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

/// True when both URLs parse and have exactly the same host.
///
/// No subdomain folding: `www.example.com` and `example.com` differ.
pub fn same_domain(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => match (a.host_str(), b.host_str()) {
            (Some(host_a), Some(host_b)) => host_a.eq_ignore_ascii_case(host_b),
            _ => false,
        },
        _ => false,
    }
}

/// The crawl's target domain: the seed host without a leading "www.".
pub fn domain_label(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// `scheme://host[:port]` of a URL.
pub fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

pub fn is_http_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
