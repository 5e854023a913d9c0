// src/fetch/markdown.rs
// =============================================================================
// This module extracts links from Markdown pages (README.md, docs, ...).
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Is fast and memory-efficient (it's a streaming parser)
//
// Relative links are resolved against the page URL, the same way the HTML
// extractor does it, so "[docs](./docs/guide.md)" becomes a crawlable URL.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};
use url::Url;

use super::html::resolve_link;

// Extracts all crawlable links from Markdown text, in document order
//
// Example:
//   markdown = "Check out [Rust](https://www.rust-lang.org)!"
//   result = ["https://www.rust-lang.org/"]
pub fn extract_markdown_links(markdown: &str, base: &Url) -> Vec<String> {
    Parser::new(markdown)
        .filter_map(|event| match event {
            // In pulldown-cmark 0.9, Link is Tag::Link(link_type, dest_url, title)
            Event::Start(Tag::Link(_link_type, dest_url, _title)) => {
                resolve_link(base, &dest_url)
            }
            _ => None,
        })
        .collect()
}

// Decides whether a fetched page should be parsed as Markdown
//
// The Content-Type header wins when the server sends a useful one;
// otherwise the file extension decides.
pub fn is_markdown(url: &Url, content_type: Option<&str>) -> bool {
    if let Some(content_type) = content_type {
        if content_type.starts_with("text/markdown") || content_type.starts_with("text/x-markdown") {
            return true;
        }
        if content_type.starts_with("text/html") {
            return false;
        }
    }
    let path = url.path().to_ascii_lowercase();
    path.ends_with(".md") || path.ends_with(".markdown")
}
