// src/fetch/graph.rs
// =============================================================================
// An in-memory link graph that pretends to be the web.
//
// Each entry maps a URL to its body and the URLs it links to. Fetching a URL
// that isn't in the map fails with "not found", just like a 404.
//
// Uses:
// - `--demo`: crawl a small built-in site without touching the network
// - `--graph file.json`: crawl a link graph you wrote by hand
// - Tests: deterministic pages for checking the crawler
//
// Graph file format:
//   {
//     "https://example.com/": { "body": "Home", "urls": ["https://example.com/a"] },
//     "https://example.com/a": { "body": "A", "urls": [] }
//   }
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::{FetchError, Fetcher, Page};

/// One page of a link graph file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphPage {
    pub body: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Serves pages from a fixed URL -> page map.
#[derive(Debug, Clone, Default)]
pub struct GraphFetcher {
    pages: HashMap<String, GraphPage>,
}

impl GraphFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a page.
    pub fn with_page(mut self, url: &str, body: &str, urls: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            GraphPage {
                body: body.to_string(),
                urls: urls.iter().map(|u| u.to_string()).collect(),
            },
        );
        self
    }

    /// The built-in demo site: four linked pages with cycles back to the root,
    /// plus two links to pages that don't exist.
    pub fn demo() -> Self {
        Self::new()
            .with_page(
                "https://golang.org/",
                "The Go Programming Language",
                &["https://golang.org/pkg/", "https://golang.org/cmd/"],
            )
            .with_page(
                "https://golang.org/pkg/",
                "Packages",
                &[
                    "https://golang.org/",
                    "https://golang.org/cmd/",
                    "https://golang.org/pkg/fmt/",
                    "https://golang.org/pkg/os/",
                ],
            )
            .with_page(
                "https://golang.org/pkg/fmt/",
                "Package fmt",
                &["https://golang.org/", "https://golang.org/pkg/"],
            )
            .with_page(
                "https://golang.org/pkg/os/",
                "Package os",
                &["https://golang.org/", "https://golang.org/pkg/"],
            )
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let pages: HashMap<String, GraphPage> =
            serde_json::from_str(json).context("Invalid link graph JSON")?;
        Ok(Self { pages })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read link graph {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl Fetcher for GraphFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        self.pages
            .get(url)
            .map(|page| Page::new(page.body.clone(), page.urls.clone()))
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}
