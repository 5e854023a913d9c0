// src/fetch/mod.rs
// =============================================================================
// This module defines how pages are retrieved.
//
// The crawler doesn't care where a page comes from. It only needs something
// that, given a URL, returns the page content and the links found on it.
// That "something" is the Fetcher trait.
//
// Submodules:
// - http: Fetches real pages over HTTP with reqwest
// - graph: Serves pages from an in-memory link graph (demo or JSON file)
// - html: Extracts links from HTML pages
// - markdown: Extracts links from Markdown pages
//
// Rust concepts:
// - Traits: Shared behaviour that many types can implement
// - async-trait: Async methods inside traits
// - thiserror: Deriving error types with nice messages
// =============================================================================

mod graph;
mod html;
mod http;
mod markdown;

use async_trait::async_trait;
use thiserror::Error;

pub use graph::GraphFetcher;
pub use http::{HttpFetcher, HttpFetcherOptions};

/// A successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The page body.
    pub content: String,
    /// URLs the page links to, in document order. May contain duplicates.
    pub links: Vec<String>,
}

impl Page {
    pub fn new(content: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            content: content.into(),
            links,
        }
    }
}

/// Why a page could not be fetched.
///
/// Every variant is treated the same way by the crawler: the branch stops.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Retrieves a page and its outgoing links.
///
/// Implementations are called from many crawl branches at the same time, so
/// they must be `Send + Sync` and safe to call concurrently.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait instead of calling reqwest directly?
//    - The crawler can be tested with a fake, in-memory fetcher
//    - No network is needed to check that every page is visited exactly once
//
// 2. What does #[async_trait] do?
//    - It rewrites `async fn` in the trait into a method returning a boxed
//      future, so the trait can be used as `dyn Fetcher`
//
// 3. What does #[from] do in the error enum?
//    - It generates `impl From<reqwest::Error> for FetchError`
//    - That lets us use `?` on reqwest calls inside a fetcher
// -----------------------------------------------------------------------------
