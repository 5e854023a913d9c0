// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "link-crawler",
    version,
    about = "Crawl every page reachable from a URL, visiting each page exactly once",
    long_about = "link-crawler follows links from a seed URL up to a maximum depth. \
                  Every discovered page is crawled concurrently and fetched at most once, \
                  even when many pages link to it."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com)
    pub seed: String,

    /// Maximum crawl depth
    ///
    /// Depth 0 = crawl nothing
    /// Depth 1 = just the seed page
    /// Depth 2 = seed page + all pages it links to
    /// etc.
    #[arg(long, default_value_t = 4)]
    pub max_depth: u32,

    /// Crawl a link graph from a JSON file instead of the network
    #[arg(long, conflicts_with = "demo")]
    pub graph: Option<PathBuf>,

    /// Crawl the built-in demo site instead of the network
    #[arg(long)]
    pub demo: bool,

    /// Maximum number of fetches in flight (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_concurrency: usize,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Only follow links on the seed URL's domain
    #[arg(long)]
    pub same_domain: bool,

    /// Output a JSON report instead of a summary table
    #[arg(long)]
    pub json: bool,

    /// More logging on stderr (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Where pages come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http,
    Demo,
    GraphFile(PathBuf),
}

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed: String,
    pub max_depth: u32,
    pub source: Source,
    pub max_concurrency: usize,
    pub timeout: Duration,
    pub same_domain: bool,
    pub json: bool,
}

impl Cli {
    pub fn config(&self) -> CrawlConfig {
        let source = match (&self.graph, self.demo) {
            (Some(path), _) => Source::GraphFile(path.clone()),
            (None, true) => Source::Demo,
            (None, false) => Source::Http,
        };

        CrawlConfig {
            seed: self.seed.clone(),
            max_depth: self.max_depth,
            source,
            max_concurrency: self.max_concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
            same_domain: self.same_domain,
            json: self.json,
        }
    }

    /// Default tracing filter for the -v count; RUST_LOG overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
