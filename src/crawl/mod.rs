// src/crawl/mod.rs
// =============================================================================
// This module handles crawling.
//
// Features:
// - Concurrent crawling: one task per discovered link
// - Exactly-once visits: a shared visited set with an atomic claim
// - Configurable depth limit
// - Optional cap on concurrent fetches
//
// Submodules:
// - visited: The shared URL -> content map and its claim operation
// - crawler: The recursive traversal
// - sink: Where "found"/"failed" records are reported
// - report: Summary of a finished run
// =============================================================================

mod crawler;
mod report;
mod sink;
mod visited;

pub use crawler::Crawler;
pub use report::CrawlReport;
pub use sink::{CollectingSink, CrawlEvent, DiscoverySink, LogSink, Tee};
pub use visited::{Claim, VisitedSet};
