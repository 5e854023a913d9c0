// src/crawl/report.rs
// =============================================================================
// A summary of one finished crawl run, printable as a table or as JSON.
// =============================================================================

use serde::Serialize;
use std::collections::BTreeMap;

use super::sink::CrawlEvent;
use super::visited::VisitedSet;

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    pub max_depth: u32,
    pub found: usize,
    pub failed: usize,
    /// Every claimed URL and its content. Failed URLs map to "".
    pub pages: BTreeMap<String, String>,
    /// Discovery records in arrival order.
    pub events: Vec<CrawlEvent>,
}

impl CrawlReport {
    pub fn new(seed: &str, max_depth: u32, visited: &VisitedSet, events: Vec<CrawlEvent>) -> Self {
        let failed = events.iter().filter(|e| e.is_failure()).count();
        Self {
            seed: seed.to_string(),
            max_depth,
            found: events.len() - failed,
            failed,
            pages: visited.snapshot(),
            events,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
