// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (stderr) and parse command-line arguments
// 2. Dispatch to the subcommand handler (crawl, links, orphans)
// 3. Print results and write the report files
// 4. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

mod checker; // src/checker/ - link health and orphan analysis
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated run settings
mod crawl; // src/crawl/ - site discovery
mod fetch; // src/fetch/ - HTTP access
mod logging; // src/logging.rs - tracing setup

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use checker::{BrokenLinkResult, LinkOutcome, LinkStatus};
use cli::{Cli, Commands, CrawlArgs, LinksArgs, OrphansArgs};
use crawl::CrawlResult;
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = success / no broken links
//   Ok(1) = broken links found
//   Err   = the operation could not run at all
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init()?;

    match cli.command {
        Commands::Crawl(args) => handle_crawl(args).await,
        Commands::Links(args) => handle_links(args).await,
        Commands::Orphans(args) => handle_orphans(args),
    }
}

async fn handle_crawl(args: CrawlArgs) -> Result<i32> {
    let config = args.to_config();
    config.validate()?;

    let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout())
        .context("create HTTP client")?;
    let limiter = crawl::rate::from_delay(config.rate_limit());

    if !args.json {
        println!("🔍 Discovering pages on: {}", args.url);
        println!("📊 Max depth: {}, max pages: {}", config.max_depth, config.max_pages);
    }

    let result = crawl::discover_site(&args.url, &config, &fetcher, limiter.as_ref()).await?;

    result.save(&args.output)?;
    info!(path = %args.output.display(), "crawl result written");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_crawl_summary(&result);
        println!("💾 Saved to {}", args.output.display());
    }

    Ok(0)
}

async fn handle_links(args: LinksArgs) -> Result<i32> {
    let config = args.to_config();
    let crawl = CrawlResult::load(&args.input)?;

    let fetcher = HttpFetcher::new(&config.user_agent, config.external_timeout())
        .context("create HTTP client")?;
    let limiter = crawl::rate::from_delay(config.rate_limit());

    if !args.json {
        println!(
            "🌐 Checking links from {} page(s) of {}...\n",
            crawl.pages.len(),
            crawl.domain
        );
    }

    let result = checker::check_links(&crawl.pages, &config, &fetcher, limiter.as_ref()).await?;
    result.save(&args.output)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_link_table(&result);
        println!("💾 Saved to {}", args.output.display());
    }

    if result.broken.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn handle_orphans(args: OrphansArgs) -> Result<i32> {
    let crawl = CrawlResult::load(&args.input)?;
    let orphans = checker::find_orphans(&crawl.pages, &crawl.start_url);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&orphans)?);
        return Ok(0);
    }

    if orphans.is_empty() {
        println!("✅ No orphan pages among {} page(s)", crawl.pages.len());
    } else {
        println!("🏝️  {} orphan page(s):", orphans.len());
        for url in &orphans {
            println!("   {}", url);
        }
    }

    Ok(0)
}

fn print_crawl_summary(result: &CrawlResult) {
    let source = if result.sitemap_used {
        "sitemap.xml"
    } else {
        "link crawling"
    };

    println!();
    println!("{:<60} {:<8} {:<8}", "PAGE", "LINKS", "WORDS");
    println!("{}", "=".repeat(78));
    for page in &result.pages {
        println!(
            "{:<60} {:<8} {:<8}",
            truncate(&page.url, 57),
            page.internal_links.len() + page.external_links.len(),
            page.word_count
        );
    }
    println!();

    println!("📊 Summary:");
    println!("   🌍 Domain: {}", result.domain);
    println!("   🗺️  Found via: {}", source);
    println!("   📄 Pages: {}", result.total_pages);
    println!("   ⚠️  Errors: {}", result.errors.len());
    println!("   ⏱️  Took: {} ms", result.duration_ms);

    for error in &result.errors {
        println!("   ❌ {} ({})", error.url, error.error);
    }
}

// Prints results as a human-readable table in the terminal
fn print_link_table(result: &BrokenLinkResult) {
    println!("{:<60} {:<15} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(105));

    for status in result.broken.iter().chain(result.redirected.iter()) {
        println!(
            "{:<60} {:<15} {:<30}",
            truncate(&status.url, 57),
            format_status(status),
            status_message(status)
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ OK: {}", result.working);
    println!("   ❌ Broken: {}", result.broken.len());
    println!("   🔍 404s: {}", result.summary.not_found);
    println!("   ⏱️  Timeouts: {}", result.summary.timeouts);
    println!("   🔁 Long redirect chains: {}", result.summary.long_redirect_chains);
    println!("   📋 Total: {}", result.total_checked);
}

fn format_status(status: &LinkStatus) -> String {
    match status.outcome {
        LinkOutcome::Working if status.redirect_chain > 0 => "🔀 REDIRECT".to_string(),
        LinkOutcome::Working => "✅ OK".to_string(),
        LinkOutcome::Broken => format!("❌ {}", status.status),
        LinkOutcome::Timeout => "⏱️  TIMEOUT".to_string(),
        LinkOutcome::Error => "⚠️  ERROR".to_string(),
    }
}

fn status_message(status: &LinkStatus) -> String {
    if let Some(error) = &status.error {
        return error.clone();
    }
    match &status.redirect_to {
        Some(target) => format!("{} hop(s) -> {}", status.redirect_chain, target),
        None => status.status_text.clone(),
    }
}

// Shortens long URLs for table display
fn truncate(url: &str, max: usize) -> String {
    if url.chars().count() > max {
        let head: String = url.chars().take(max).collect();
        format!("{}...", head)
    } else {
        url.to_string()
    }
}
