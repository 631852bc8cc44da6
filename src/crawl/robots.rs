// src/crawl/robots.rs
// =============================================================================
// robots.txt handling.
//
// We only care about three directives:
// - User-agent: starts a block; consecutive User-agent lines share one block,
//   which applies to us if any of them names our agent or is the wildcard "*"
// - Allow / Disallow: path prefixes, where "*" matches any characters
// - Sitemap: just recorded, it does not change how we crawl
//
// Entering a block that applies to us throws away the rules collected so far,
// so the last matching block is the one in force.
//
// Checking a path: a Disallow match blocks it unless an Allow rule also
// matches. Paths matching nothing are allowed. A missing or garbled robots.txt
// allows everything; parsing never fails.
// =============================================================================

use regex::Regex;

/// One Allow/Disallow value compiled to an anchored regex.
#[derive(Debug, Clone)]
struct PathPattern {
    raw: String,
    regex: Regex,
}

impl PathPattern {
    fn new(value: &str) -> Option<Self> {
        let escaped = regex::escape(value).replace(r"\*", ".*");
        let regex = Regex::new(&format!("^{}", escaped)).ok()?;
        Some(Self {
            raw: value.to_string(),
            regex,
        })
    }

    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// The rules that apply to one crawler identity.
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    allow: Vec<PathPattern>,
    disallow: Vec<PathPattern>,
    has_sitemap: bool,
}

impl RobotsPolicy {
    /// A policy that allows every path.
    pub fn permit_all() -> Self {
        Self::default()
    }

    /// Parses a robots.txt document for `agent`.
    pub fn parse(robots_txt: &str, agent: &str) -> Self {
        let mut policy = Self::default();
        let mut in_matching_block = false;
        // The previous directive was a User-agent line
        let mut reading_agents = false;

        for line in robots_txt.lines() {
            // Strip comments and surrounding whitespace
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            let key = key.trim().to_ascii_lowercase();
            let agent_line = key == "user-agent";

            match key.as_str() {
                "user-agent" => {
                    if !reading_agents {
                        in_matching_block = false;
                    }
                    let names_us = value == "*" || value.eq_ignore_ascii_case(agent);
                    if names_us && !in_matching_block {
                        in_matching_block = true;
                        policy.allow.clear();
                        policy.disallow.clear();
                    }
                }
                // An empty Disallow means "nothing is disallowed"
                "disallow" if in_matching_block && !value.is_empty() => {
                    policy.disallow.extend(PathPattern::new(value));
                }
                "allow" if in_matching_block && !value.is_empty() => {
                    policy.allow.extend(PathPattern::new(value));
                }
                "sitemap" => policy.has_sitemap = true,
                _ => {}
            }
            reading_agents = agent_line;
        }

        policy
    }

    /// May `path` be fetched?
    pub fn can_crawl(&self, path: &str) -> bool {
        if !self.disallow.iter().any(|p| p.matches(path)) {
            return true;
        }
        self.allow.iter().any(|p| p.matches(path))
    }

    /// Did the document declare a sitemap?
    pub fn can_use_sitemap(&self) -> bool {
        self.has_sitemap
    }

    pub fn disallow_patterns(&self) -> impl Iterator<Item = &str> {
        self.disallow.iter().map(|p| p.raw.as_str())
    }

    pub fn allow_patterns(&self) -> impl Iterator<Item = &str> {
        self.allow.iter().map(|p| p.raw.as_str())
    }
}
