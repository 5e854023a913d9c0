// src/crawl/visited.rs
// =============================================================================
// The visited set: every URL the crawler has claimed during one run, mapped
// to the content fetched for it.
//
// How it works:
// 1. Before a URL is fetched, the crawler "claims" it
// 2. A claim inserts the URL with an empty placeholder, under a mutex
// 3. Only the caller whose claim succeeded may fetch the URL and store its body
// 4. Everyone else sees the URL is present and skips it
//
// Check-and-insert happens inside one lock acquisition, so two branches that
// discover the same URL at the same moment can never both win the claim.
//
// Rust concepts:
// - Mutex: Exclusive access to shared data across threads
// - HashMap/BTreeMap: Key-value maps (BTreeMap keeps keys sorted)
// - Move semantics: A Claim is consumed when you store through it
// =============================================================================

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

/// URL -> fetched content for a single crawl run.
///
/// A claimed slot holds an empty string until its fetch completes. Slots of
/// failed fetches keep the empty placeholder for the rest of the run.
#[derive(Debug, Default)]
pub struct VisitedSet {
    pages: Mutex<HashMap<String, String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` if nobody has claimed it yet.
    ///
    /// Returns true if this call inserted the placeholder, false if the URL was
    /// already present (the set is left unchanged in that case).
    pub fn claim_if_absent(&self, url: &str) -> bool {
        let mut pages = self.lock();
        if pages.contains_key(url) {
            return false;
        }
        pages.insert(url.to_string(), String::new());
        true
    }

    /// Same as [`claim_if_absent`](Self::claim_if_absent), but hands back the
    /// write capability for the slot.
    ///
    /// The returned [`Claim`] is the only value that can store content for
    /// `url`, and it can only do so once.
    pub fn claim(self: &Arc<Self>, url: &str) -> Option<Claim> {
        if self.claim_if_absent(url) {
            Some(Claim {
                set: Arc::clone(self),
                url: url.to_string(),
            })
        } else {
            None
        }
    }

    /// Replaces the content of an already-claimed URL.
    ///
    /// Returns false (and changes nothing) if `url` was never claimed.
    pub fn store(&self, url: &str, content: String) -> bool {
        match self.lock().get_mut(url) {
            Some(slot) => {
                *slot = content;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    /// Content stored for `url`; `Some("")` for a claimed slot with no body yet.
    pub fn get(&self, url: &str) -> Option<String> {
        self.lock().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the whole set, sorted by URL.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock()
            .iter()
            .map(|(url, content)| (url.clone(), content.clone()))
            .collect()
    }

    // A panic while the lock is held cannot leave the map half-updated (every
    // critical section is a single insert or assignment), so a poisoned lock
    // is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive right to write the content of one claimed URL.
///
/// Not `Clone`: there is exactly one per successful claim.
#[derive(Debug)]
pub struct Claim {
    set: Arc<VisitedSet>,
    url: String,
}

impl Claim {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Writes the fetched content into the claimed slot, consuming the claim.
    pub fn store(self, content: String) {
        self.set.store(&self.url, content);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Mutex and not a RwLock?
//    - Almost every operation on the set is a write (claiming)
//    - A plain Mutex is simpler and just as fast for that pattern
//
// 2. What is `self: &Arc<Self>`?
//    - A method that can only be called through an Arc
//    - It lets claim() put a second Arc (a cheap reference count bump) into
//      the Claim, so the Claim can outlive the borrow of the set
//
// 3. Why does Claim::store take `self` and not `&self`?
//    - Taking `self` moves the Claim into the function
//    - After the call the Claim no longer exists, so nobody can store twice
//    - The compiler enforces this for us
//
// 4. Is it ever OK to hold a std Mutex across .await?
//    - No! Every lock in this file is released before the function returns,
//      so callers in async code never hold it across an await point
// -----------------------------------------------------------------------------
