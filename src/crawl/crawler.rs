// src/crawl/crawler.rs
// =============================================================================
// The crawler: a recursive, concurrent, depth-bounded traversal.
//
// How it works, for crawl(url, depth):
// 1. depth == 0 -> stop (nothing is claimed or fetched)
// 2. Claim the URL in the visited set -> stop if someone else already has it
// 3. Fetch the page -> on failure, report it and stop this branch
// 4. Store the content and report the page as found
// 5. Spawn one task per link, each running crawl(link, depth - 1)
// 6. Wait for every spawned task before returning
//
// Because of step 6, `crawler.crawl(seed, depth, fetcher).await` only
// finishes once the whole tree under the seed has been explored.
//
// Step 2 is the only place deduplication happens. Cycles in the link graph
// and duplicate links on a page need no special handling: the second visit
// simply loses the claim.
//
// Rust concepts:
// - tokio::spawn / JoinSet: Parallel tasks and waiting for all of them
// - BoxFuture: A heap-allocated future, needed for recursive async code
// - Arc<dyn Trait>: Shared ownership of trait objects across tasks
// - Semaphore: Optional cap on how many fetches run at once
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::sink::DiscoverySink;
use super::visited::VisitedSet;
use crate::fetch::Fetcher;

/// Drives one crawl run.
///
/// Cloning is cheap and every clone shares the same visited set and sink;
/// that's how spawned branches cooperate. Create a new crawler for each
/// independent run.
#[derive(Clone)]
pub struct Crawler {
    visited: Arc<VisitedSet>,
    sink: Arc<dyn DiscoverySink>,
    fetch_permits: Option<Arc<Semaphore>>,
}

impl Crawler {
    pub fn new(sink: Arc<dyn DiscoverySink>) -> Self {
        Self {
            visited: Arc::new(VisitedSet::new()),
            sink,
            fetch_permits: None,
        }
    }

    /// Caps the number of fetches in flight across the whole run.
    ///
    /// Zero means no cap. Permits are only held while a fetch runs, never
    /// while a branch waits for its children.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.fetch_permits = (max > 0).then(|| Arc::new(Semaphore::new(max)));
        self
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Crawls `url` and everything reachable from it within `depth` hops.
    ///
    /// A depth of 1 fetches only `url` itself. Fetch failures are reported
    /// to the sink and end their own branch; the returned future always
    /// completes.
    pub fn crawl(
        &self,
        url: impl Into<String>,
        depth: u32,
        fetcher: Arc<dyn Fetcher>,
    ) -> BoxFuture<'static, ()> {
        let crawler = self.clone();
        let url = url.into();
        async move { crawler.visit(url, depth, fetcher).await }.boxed()
    }

    async fn visit(self, url: String, depth: u32, fetcher: Arc<dyn Fetcher>) {
        if depth == 0 {
            return;
        }

        let Some(claim) = self.visited.claim(&url) else {
            debug!(%url, "already claimed, skipping");
            return;
        };

        let result = {
            // A closed semaphore would mean "no cap", but we never close it
            let _permit = match &self.fetch_permits {
                Some(permits) => permits.acquire().await.ok(),
                None => None,
            };
            fetcher.fetch(&url).await
        };

        let page = match result {
            Ok(page) => page,
            Err(error) => {
                // The claim is dropped unused: the slot keeps its empty
                // placeholder and the URL is never retried in this run
                self.sink.failed(&url, &error);
                return;
            }
        };

        claim.store(page.content.clone());
        self.sink.found(&url, &page.content);

        let mut children = JoinSet::new();
        for link in page.links {
            children.spawn(self.crawl(link, depth - 1, Arc::clone(&fetcher)));
        }

        while let Some(joined) = children.join_next().await {
            if let Err(error) = joined {
                warn!(parent = %url, %error, "crawl branch ended abnormally");
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does crawl() return BoxFuture instead of being an `async fn`?
//    - An async fn that awaits itself would have an infinitely large type
//    - Boxing the future puts it on the heap and gives it a fixed size
//    - futures::FutureExt::boxed() does exactly that
//
// 2. Why clone the crawler for every call?
//    - tokio::spawn needs a 'static future (it can't borrow from the caller)
//    - The clone is just three Arc reference counts, so it's cheap
//
// 3. What is JoinSet?
//    - A collection of spawned tasks
//    - join_next() waits for the next task to finish, in completion order
//    - When it returns None, every task has finished
//
// 4. What happens if a task panics?
//    - join_next() returns Err(JoinError) for that task
//    - We log it and keep waiting for the others; siblings are unaffected
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::sink::{CollectingSink, CrawlEvent};
    use crate::fetch::{FetchError, GraphFetcher, Page};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // Wraps a GraphFetcher and records how often each URL was fetched and
    // how many fetches ran at the same time.
    struct CountingFetcher {
        inner: GraphFetcher,
        delay: Duration,
        calls: Mutex<HashMap<String, usize>>,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(inner: GraphFetcher) -> Self {
            Self::with_delay(inner, Duration::ZERO)
        }

        fn with_delay(inner: GraphFetcher, delay: Duration) -> Self {
            Self {
                inner,
                delay,
                calls: Mutex::new(HashMap::new()),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> HashMap<String, usize> {
            self.calls.lock().unwrap().clone()
        }

        fn total_calls(&self) -> usize {
            self.calls().values().sum()
        }
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            self.inner.fetch(url).await
        }
    }

    struct PanickingFetcher {
        inner: GraphFetcher,
    }

    #[async_trait]
    impl Fetcher for PanickingFetcher {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            if url == "boom" {
                panic!("fetcher exploded on {}", url);
            }
            self.inner.fetch(url).await
        }
    }

    fn setup() -> (Crawler, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        (Crawler::new(sink.clone()), sink)
    }

    fn abc_graph() -> GraphFetcher {
        GraphFetcher::new()
            .with_page("A", "bodyA", &["B", "C"])
            .with_page("B", "bodyB", &["A"])
            .with_page("C", "bodyC", &[])
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_abc_scenario_fetches_each_page_once() {
        let (crawler, sink) = setup();
        let fetcher = Arc::new(CountingFetcher::new(abc_graph()));

        crawler.crawl("A", 2, fetcher.clone()).await;

        let calls = fetcher.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.values().all(|&n| n == 1));

        let expected: BTreeMap<String, String> = [("A", "bodyA"), ("B", "bodyB"), ("C", "bodyC")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(crawler.visited().snapshot(), expected);

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| !e.is_failure()));
    }

    #[tokio::test]
    async fn test_zero_depth_visits_nothing() {
        let (crawler, sink) = setup();
        let fetcher = Arc::new(CountingFetcher::new(abc_graph()));

        crawler.crawl("X", 0, fetcher.clone()).await;

        assert_eq!(fetcher.total_calls(), 0);
        assert!(crawler.visited().is_empty());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_depth_one_fetches_only_the_seed() {
        let (crawler, _sink) = setup();
        let fetcher = Arc::new(CountingFetcher::new(abc_graph()));

        crawler.crawl("A", 1, fetcher.clone()).await;

        assert_eq!(fetcher.calls().keys().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(crawler.visited().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_nothing_beyond_max_depth_is_fetched() {
        let (crawler, _sink) = setup();
        let chain = GraphFetcher::new()
            .with_page("a", "1", &["b"])
            .with_page("b", "2", &["c"])
            .with_page("c", "3", &["d"])
            .with_page("d", "4", &[]);
        let fetcher = Arc::new(CountingFetcher::new(chain));

        crawler.crawl("a", 2, fetcher.clone()).await;

        let mut fetched: Vec<_> = fetcher.calls().into_keys().collect();
        fetched.sort();
        assert_eq!(fetched, vec!["a", "b"]);
        // "c" was discovered at depth 0, so it was never even claimed
        assert!(!crawler.visited().contains("c"));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_placeholder_and_run_completes() {
        let (crawler, sink) = setup();
        let fetcher = Arc::new(GraphFetcher::new());

        crawler.crawl("A", 3, fetcher).await;

        assert_eq!(
            sink.events(),
            vec![CrawlEvent::Failed {
                url: "A".to_string(),
                error: "not found: A".to_string(),
            }]
        );
        assert_eq!(crawler.visited().get("A").as_deref(), Some(""));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failure_does_not_stop_siblings() {
        let (crawler, sink) = setup();
        let graph = GraphFetcher::new()
            .with_page("root", "r", &["missing", "ok"])
            .with_page("ok", "fine", &["leaf"])
            .with_page("leaf", "l", &[]);

        crawler.crawl("root", 3, Arc::new(graph)).await;

        assert_eq!(sink.failures(), 1);
        let found: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| !e.is_failure())
            .map(|e| e.url().to_string())
            .collect();
        assert_eq!(found.len(), 3);
        assert_eq!(crawler.visited().get("leaf").as_deref(), Some("l"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_demo_graph() {
        let (crawler, sink) = setup();

        crawler.crawl("https://golang.org/", 4, Arc::new(GraphFetcher::demo())).await;

        let events = sink.events();
        assert_eq!(events.iter().filter(|e| !e.is_failure()).count(), 4);
        // cmd/ is linked from two pages but only claimed (and failed) once
        assert_eq!(sink.failures(), 1);
        assert_eq!(crawler.visited().len(), 5);
        assert_eq!(crawler.visited().get("https://golang.org/cmd/").as_deref(), Some(""));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_dense_cyclic_graph_no_double_fetch() {
        const NODES: usize = 20;
        let names: Vec<String> = (0..NODES).map(|i| format!("n{}", i)).collect();
        let all: Vec<&str> = names.iter().map(String::as_str).collect();

        // Every node links to every node, including itself
        let graph = all
            .iter()
            .fold(GraphFetcher::new(), |g, name| g.with_page(name, name, &all));
        let fetcher = Arc::new(CountingFetcher::with_delay(graph, Duration::from_millis(2)));
        let (crawler, sink) = setup();

        crawler.crawl("n0", 5, fetcher.clone()).await;

        let calls = fetcher.calls();
        assert_eq!(calls.len(), NODES);
        assert!(calls.values().all(|&n| n == 1));
        assert_eq!(sink.events().len(), NODES);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_duplicate_links_on_one_page() {
        let dupes = vec!["x"; 50];
        let graph = GraphFetcher::new()
            .with_page("seed", "s", &dupes)
            .with_page("x", "bodyX", &["seed", "x"]);
        let fetcher = Arc::new(CountingFetcher::with_delay(graph, Duration::from_millis(1)));
        let (crawler, _sink) = setup();

        crawler.crawl("seed", 3, fetcher.clone()).await;

        assert_eq!(fetcher.calls().get("x"), Some(&1));
        assert_eq!(fetcher.calls().get("seed"), Some(&1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_unbounded_fan_out_runs_in_parallel() {
        let leaves: Vec<String> = (0..20).map(|i| format!("leaf{}", i)).collect();
        let leaf_refs: Vec<&str> = leaves.iter().map(String::as_str).collect();
        let graph = leaf_refs
            .iter()
            .fold(GraphFetcher::new().with_page("root", "r", &leaf_refs), |g, leaf| {
                g.with_page(leaf, leaf, &[])
            });
        let fetcher = Arc::new(CountingFetcher::with_delay(graph, Duration::from_millis(50)));
        let (crawler, _sink) = setup();

        crawler.crawl("root", 2, fetcher.clone()).await;

        assert_eq!(fetcher.total_calls(), 21);
        assert!(fetcher.peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrency_cap_is_respected() {
        let leaves: Vec<String> = (0..20).map(|i| format!("leaf{}", i)).collect();
        let leaf_refs: Vec<&str> = leaves.iter().map(String::as_str).collect();
        let graph = leaf_refs
            .iter()
            .fold(GraphFetcher::new().with_page("root", "r", &leaf_refs), |g, leaf| {
                g.with_page(leaf, leaf, &["root"])
            });
        let fetcher = Arc::new(CountingFetcher::with_delay(graph, Duration::from_millis(10)));
        let sink = Arc::new(CollectingSink::new());
        let crawler = Crawler::new(sink.clone()).with_max_concurrency(3);

        crawler.crawl("root", 3, fetcher.clone()).await;

        assert_eq!(fetcher.total_calls(), 21);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(sink.events().len(), 21);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_panicking_branch_does_not_abort_the_run() {
        let graph = GraphFetcher::new()
            .with_page("root", "r", &["boom", "ok"])
            .with_page("ok", "fine", &[]);
        let fetcher = Arc::new(PanickingFetcher { inner: graph });
        let (crawler, sink) = setup();

        crawler.crawl("root", 2, fetcher).await;

        assert_eq!(crawler.visited().get("ok").as_deref(), Some("fine"));
        assert!(crawler.visited().contains("boom"));
        assert_eq!(sink.events().len(), 2);
    }

    #[tokio::test]
    async fn test_separate_crawlers_do_not_share_state() {
        let fetcher = Arc::new(CountingFetcher::new(abc_graph()));

        let (first, _) = setup();
        first.crawl("A", 2, fetcher.clone()).await;
        let (second, _) = setup();
        second.crawl("A", 2, fetcher.clone()).await;

        assert_eq!(second.visited().len(), 3);
        assert!(fetcher.calls().values().all(|&n| n == 2));
    }
}
