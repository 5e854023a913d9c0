// src/lib.rs
// =============================================================================
// link-crawler as a library.
//
// The binary (src/main.rs) is a thin wrapper around these two modules:
// - crawl: The concurrent crawler, its visited set and discovery sinks
// - fetch: The Fetcher trait and the HTTP / in-memory fetchers
//
// Example:
//   let sink = Arc::new(CollectingSink::new());
//   let crawler = Crawler::new(sink.clone());
//   crawler.crawl("https://golang.org/", 4, Arc::new(GraphFetcher::demo())).await;
//   println!("{} pages", crawler.visited().len());
// =============================================================================

pub mod crawl;
pub mod fetch;
