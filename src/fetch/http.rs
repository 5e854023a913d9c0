// src/fetch/http.rs
// =============================================================================
// This module fetches real web pages over HTTP.
//
// How it works:
// 1. Parse and validate the URL
// 2. GET the page with a shared reqwest Client (connection pooling)
// 3. Treat any non-2xx status as a failed fetch
// 4. Extract links from the body (HTML or Markdown)
// 5. Optionally keep only links on the seed's domain
//
// Rust concepts:
// - async/await: For network I/O without blocking threads
// - Builder pattern: reqwest::Client::builder()
// - Option<String>: The domain filter may or may not be set
// =============================================================================

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::html::extract_html_links;
use super::markdown::{extract_markdown_links, is_markdown};
use super::{FetchError, Fetcher, Page};

/// Settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum redirects followed before the request fails.
    pub max_redirects: usize,
    /// When set, links to other domains are dropped.
    pub same_domain: Option<String>,
}

impl Default for HttpFetcherOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_redirects: 5,
            same_domain: None,
        }
    }
}

/// Fetches pages with reqwest and extracts their links.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    same_domain: Option<String>,
}

impl HttpFetcher {
    pub fn new(options: HttpFetcherOptions) -> Result<Self, FetchError> {
        // We'll reuse this client for all requests (connection pooling)
        let client = Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            same_domain: options.same_domain,
        })
    }

    fn keep_link(&self, link: &str) -> bool {
        let Some(domain) = &self.same_domain else {
            return true;
        };
        Url::parse(link)
            .ok()
            .and_then(|url| url.domain().map(|d| d == domain))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let base = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self.client.get(base).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Relative links resolve against where we ended up after redirects
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await?;

        let links = if is_markdown(&final_url, content_type.as_deref()) {
            extract_markdown_links(&body, &final_url)
        } else {
            extract_html_links(&body, &final_url)
        };
        let links: Vec<String> = links.into_iter().filter(|l| self.keep_link(l)).collect();

        debug!(url, status = status.as_u16(), links = links.len(), "fetched page");
        Ok(Page::new(body, links))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why response.url() instead of the URL we asked for?
//    - reqwest follows redirects, so the page may live somewhere else
//    - Relative links on the page are relative to where it actually lives
//
// 2. What is `let Some(domain) = ... else { ... }`?
//    - "let-else": bind the value if it matches, otherwise run the else block
//    - The else block must leave the function (return, break, ...)
//
// 3. Why does `?` work on reqwest errors here?
//    - FetchError has `#[from] reqwest::Error`, so `?` converts automatically
// -----------------------------------------------------------------------------
