// src/crawl/sink.rs
// =============================================================================
// Where discovery records go.
//
// Every time the crawler visits a new URL it reports one of two things:
// - found: the page was fetched (URL + content)
// - failed: the fetch failed (URL + error message)
//
// Sinks:
// - LogSink: prints records to the terminal (and to tracing)
// - CollectingSink: keeps every record in memory (for --json and tests)
// - Tee: sends every record to two sinks
//
// Records from different branches arrive in whatever order the branches
// finish; sinks must not assume any ordering.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::fetch::FetchError;

/// One discovery record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    Found { url: String, content: String },
    Failed { url: String, error: String },
}

impl CrawlEvent {
    pub fn url(&self) -> &str {
        match self {
            CrawlEvent::Found { url, .. } | CrawlEvent::Failed { url, .. } => url,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CrawlEvent::Failed { .. })
    }
}

/// Receives discovery records. Called concurrently from many branches.
pub trait DiscoverySink: Send + Sync {
    fn found(&self, url: &str, content: &str);
    fn failed(&self, url: &str, error: &FetchError);
}

/// Prints `found: <url> "<content>"` lines to stdout and errors to stderr.
#[derive(Debug, Clone)]
pub struct LogSink {
    max_content: usize,
}

impl LogSink {
    /// `max_content` caps how many characters of each body get printed.
    pub fn new(max_content: usize) -> Self {
        Self { max_content }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(80)
    }
}

impl DiscoverySink for LogSink {
    fn found(&self, url: &str, content: &str) {
        info!(url, bytes = content.len(), "found page");
        println!("found: {} {:?}", url, truncate(content, self.max_content));
    }

    fn failed(&self, url: &str, error: &FetchError) {
        warn!(url, %error, "fetch failed");
        eprintln!("{}", error);
    }
}

/// Keeps every record in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<CrawlEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CrawlEvent> {
        self.lock().clone()
    }

    pub fn failures(&self) -> usize {
        self.lock().iter().filter(|e| e.is_failure()).count()
    }

    fn push(&self, event: CrawlEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CrawlEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiscoverySink for CollectingSink {
    fn found(&self, url: &str, content: &str) {
        self.push(CrawlEvent::Found {
            url: url.to_string(),
            content: content.to_string(),
        });
    }

    fn failed(&self, url: &str, error: &FetchError) {
        self.push(CrawlEvent::Failed {
            url: url.to_string(),
            error: error.to_string(),
        });
    }
}

/// Forwards every record to both sinks, left first.
pub struct Tee {
    left: Arc<dyn DiscoverySink>,
    right: Arc<dyn DiscoverySink>,
}

impl Tee {
    pub fn new(left: Arc<dyn DiscoverySink>, right: Arc<dyn DiscoverySink>) -> Self {
        Self { left, right }
    }
}

impl DiscoverySink for Tee {
    fn found(&self, url: &str, content: &str) {
        self.left.found(url, content);
        self.right.found(url, content);
    }

    fn failed(&self, url: &str, error: &FetchError) {
        self.left.failed(url, error);
        self.right.failed(url, error);
    }
}

// Cuts `s` to at most `max` characters (not bytes, so we never split a
// multi-byte character) and marks the cut with "..."
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
