// src/checker/mod.rs
// =============================================================================
// Analyses that run on a finished crawl.
//
// Submodules:
// - http: link health (working / broken / timeout / redirect chains)
// - orphans: pages nothing links to
//
// Both read the page list from a `CrawlResult`; neither changes it.
// =============================================================================

mod http;
mod orphans;

// Re-export public items from submodules
pub use http::{check_links, BrokenLinkResult, LinkOutcome, LinkStatus};
pub use orphans::find_orphans;
