// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - crawl:   discover a site's pages and write the crawl result
// - links:   check every link in a crawl result
// - orphans: list pages no other page links to
//
// `links` and `orphans` read the file that `crawl` wrote, so a site is only
// crawled once no matter how many analyses run on it.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{CrawlConfig, LinkCheckConfig, DEFAULT_USER_AGENT};

pub const DEFAULT_CRAWL_FILE: &str = "crawl-result.json";
pub const DEFAULT_LINK_REPORT_FILE: &str = "link-report.json";

#[derive(Parser, Debug)]
#[command(
    name = "site-auditor",
    version,
    about = "Map a website's pages and audit its links",
    long_about = "site-auditor discovers the pages of a website (sitemap first, link crawling \
                  as a fallback), writes them to a crawl result file, and runs link-health and \
                  orphan-page checks on that file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover the pages of a website
    ///
    /// Example: site-auditor crawl https://example.com --max-depth 2
    Crawl(CrawlArgs),

    /// Check the links found by a previous crawl
    ///
    /// Example: site-auditor links --input crawl-result.json --include-external
    Links(LinksArgs),

    /// List pages that no other page links to
    ///
    /// Example: site-auditor orphans --input crawl-result.json
    Orphans(OrphansArgs),
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Website URL to start from (e.g., https://example.com)
    pub url: String,

    /// Maximum link hops from the start page (1-10)
    #[arg(long, default_value_t = 3)]
    pub max_depth: usize,

    /// Maximum number of pages to collect (1-500)
    #[arg(long, default_value_t = 50)]
    pub max_pages: usize,

    /// Ignore robots.txt
    #[arg(long)]
    pub no_robots: bool,

    /// Delay before every request, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub rate_limit_ms: u64,

    /// Timeout for each page request, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// User-Agent header, also used to pick the robots.txt block
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Where to write the crawl result
    #[arg(long, default_value = DEFAULT_CRAWL_FILE)]
    pub output: PathBuf,

    /// Print the crawl result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl CrawlArgs {
    pub fn to_config(&self) -> CrawlConfig {
        CrawlConfig {
            max_depth: self.max_depth,
            max_pages: self.max_pages,
            respect_robots: !self.no_robots,
            rate_limit_ms: self.rate_limit_ms,
            request_timeout_ms: self.timeout_ms,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct LinksArgs {
    /// Crawl result to read
    #[arg(long, default_value = DEFAULT_CRAWL_FILE)]
    pub input: PathBuf,

    /// Also check links to other domains
    #[arg(long)]
    pub include_external: bool,

    /// Delay before every request, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub rate_limit_ms: u64,

    /// Timeout for links on the crawled site, in milliseconds
    #[arg(long, default_value_t = 5_000)]
    pub internal_timeout_ms: u64,

    /// Timeout for links to other sites, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub external_timeout_ms: u64,

    /// Redirects to follow before giving up
    #[arg(long, default_value_t = 5)]
    pub max_redirects: usize,

    /// User-Agent header for probes
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Where to write the link report
    #[arg(long, default_value = DEFAULT_LINK_REPORT_FILE)]
    pub output: PathBuf,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

impl LinksArgs {
    pub fn to_config(&self) -> LinkCheckConfig {
        LinkCheckConfig {
            include_external: self.include_external,
            rate_limit_ms: self.rate_limit_ms,
            internal_timeout_ms: self.internal_timeout_ms,
            external_timeout_ms: self.external_timeout_ms,
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct OrphansArgs {
    /// Crawl result to read
    #[arg(long, default_value = DEFAULT_CRAWL_FILE)]
    pub input: PathBuf,

    /// Output the orphan list as JSON
    #[arg(long)]
    pub json: bool,
}
