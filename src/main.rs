// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) on stderr
// 3. Pick a fetcher (HTTP, demo site, or a JSON link graph)
// 4. Crawl from the seed URL and print what was found
// 5. Exit with proper code (0 = all pages fetched, 1 = some fetches failed, 2 = error)
// =============================================================================

mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use cli::{Cli, CrawlConfig, Source};
use link_crawler::crawl::{CollectingSink, CrawlEvent, CrawlReport, Crawler, DiscoverySink, LogSink, Tee};
use link_crawler::fetch::{Fetcher, GraphFetcher, HttpFetcher, HttpFetcherOptions};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_filter());

    let exit_code = match run(cli.config()).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout stays clean for records and JSON.
// RUST_LOG, when set, wins over the -v flags.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Returns:
//   Ok(0) = every visited page was fetched
//   Ok(1) = at least one fetch failed
//   Err = setup error (bad graph file, bad URL, ...)
async fn run(config: CrawlConfig) -> Result<i32> {
    let fetcher = build_fetcher(&config)?;

    if !config.json {
        println!("🔍 Crawling: {}", config.seed);
        println!("📊 Max crawl depth: {}", config.max_depth);
    }

    // With --json, records are only collected; otherwise they're also printed
    let collector = Arc::new(CollectingSink::new());
    let sink: Arc<dyn DiscoverySink> = if config.json {
        collector.clone()
    } else {
        Arc::new(Tee::new(Arc::new(LogSink::default()), collector.clone()))
    };

    let crawler = Crawler::new(sink).with_max_concurrency(config.max_concurrency);

    let started = Instant::now();
    crawler.crawl(config.seed.clone(), config.max_depth, fetcher).await;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        pages = crawler.visited().len(),
        "crawl finished"
    );

    let report = CrawlReport::new(&config.seed, config.max_depth, crawler.visited(), collector.events());
    print_report(&report, config.json)?;

    Ok(if report.has_failures() { 1 } else { 0 })
}

fn build_fetcher(config: &CrawlConfig) -> Result<Arc<dyn Fetcher>> {
    match &config.source {
        Source::Demo => Ok(Arc::new(GraphFetcher::demo())),
        Source::GraphFile(path) => {
            let graph = GraphFetcher::from_file(path)?;
            info!(pages = graph.len(), path = %path.display(), "loaded link graph");
            Ok(Arc::new(graph))
        }
        Source::Http => {
            let same_domain = if config.same_domain {
                Some(seed_domain(&config.seed)?)
            } else {
                None
            };
            let fetcher = HttpFetcher::new(HttpFetcherOptions {
                timeout: config.timeout,
                same_domain,
                ..Default::default()
            })
            .context("Failed to create HTTP client")?;
            Ok(Arc::new(fetcher))
        }
    }
}

// The domain we restrict crawling to when --same-domain is given
fn seed_domain(seed: &str) -> Result<String> {
    let url = Url::parse(seed).map_err(|e| anyhow!("Invalid URL '{}': {}", seed, e))?;
    url.domain()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("URL has no domain: {}", seed))
}

fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(report: &CrawlReport) {
    println!();
    println!("{:<60} {:<12} {:<30}", "URL", "STATUS", "DETAIL");
    println!("{}", "=".repeat(102));

    let mut events = report.events.clone();
    events.sort_by(|a, b| a.url().cmp(b.url()));

    for event in &events {
        let (status, detail) = match event {
            CrawlEvent::Found { content, .. } => ("✅ FOUND", format!("{} bytes", content.len())),
            CrawlEvent::Failed { error, .. } => ("❌ FAILED", error.clone()),
        };
        println!("{:<60} {:<12} {:<30}", shorten(event.url(), 57), status, detail);
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Found: {}", report.found);
    println!("   ❌ Failed: {}", report.failed);
    println!("   📋 Visited: {}", report.pages.len());
}

// Truncate URL if too long for display
fn shorten(url: &str, max: usize) -> String {
    match url.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &url[..idx]),
        None => url.to_string(),
    }
}
