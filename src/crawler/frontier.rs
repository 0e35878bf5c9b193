//! Crawl frontier and visited set
//!
//! The frontier is a plain FIFO queue: the seed goes in at depth 0 and every
//! page's links go in behind everything already queued, which yields
//! breadth-first order by depth and discovery order within a depth.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be crawled, with its distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Normalized absolute URL
    pub url: Url,

    /// Link hops from the seed (the seed is depth 0)
    pub depth: u32,
}

/// FIFO frontier plus the set of URLs already taken from it
///
/// Owned by a single crawl; nothing here is shared between invocations.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTarget>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed at depth 0
    pub fn with_seed(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.offer(seed, 0);
        frontier
    }

    /// Enqueues a URL unless it was already visited or is already queued
    ///
    /// # Returns
    ///
    /// * `true` - The URL was added to the back of the queue
    /// * `false` - The URL is already known to this crawl
    pub fn offer(&mut self, url: Url, depth: u32) -> bool {
        if self.is_known(&url) {
            return false;
        }

        self.queued.insert(url.as_str().to_string());
        self.queue.push_back(CrawlTarget { url, depth });
        true
    }

    /// Takes the next target and marks it visited before it is fetched
    pub fn next_target(&mut self) -> Option<CrawlTarget> {
        let target = self.queue.pop_front()?;
        let key = target.url.as_str();
        self.queued.remove(key);
        self.visited.insert(key.to_string());
        Some(target)
    }

    /// Returns true if the URL was visited or is waiting in the queue
    pub fn is_known(&self, url: &Url) -> bool {
        let key = url.as_str();
        self.visited.contains(key) || self.queued.contains(key)
    }

    /// Returns true if the URL has been taken from the queue
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Drops every queued target; visited URLs stay recorded
    pub fn discard_pending(&mut self) {
        self.queue.clear();
        self.queued.clear();
    }

    /// Number of targets waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs taken from the queue so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://example.com{}", path)).unwrap()
    }

    #[test]
    fn test_seed_is_depth_zero() {
        let mut frontier = Frontier::with_seed(url("/"));
        let target = frontier.next_target().unwrap();
        assert_eq!(target.url, url("/"));
        assert_eq!(target.depth, 0);
        assert!(frontier.next_target().is_none());
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::default();
        frontier.offer(url("/a"), 1);
        frontier.offer(url("/b"), 1);
        frontier.offer(url("/c"), 2);

        let order: Vec<String> = std::iter::from_fn(|| frontier.next_target())
            .map(|t| t.url.path().to_string())
            .collect();
        assert_eq!(order, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_duplicate_offer_rejected_while_queued() {
        let mut frontier = Frontier::with_seed(url("/"));
        assert!(frontier.offer(url("/a"), 1));
        assert!(!frontier.offer(url("/a"), 1));
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_visited_url_never_requeued() {
        let mut frontier = Frontier::with_seed(url("/"));
        frontier.next_target();

        assert!(frontier.is_visited(&url("/")));
        assert!(!frontier.offer(url("/"), 1));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_visited_set_only_grows() {
        let mut frontier = Frontier::with_seed(url("/"));
        frontier.offer(url("/a"), 1);
        frontier.next_target();
        frontier.next_target();
        assert_eq!(frontier.visited_count(), 2);

        frontier.discard_pending();
        assert_eq!(frontier.visited_count(), 2);
    }

    #[test]
    fn test_discard_pending() {
        let mut frontier = Frontier::with_seed(url("/"));
        frontier.offer(url("/a"), 1);
        frontier.discard_pending();

        assert!(frontier.is_empty());
        assert!(!frontier.is_known(&url("/a")));
    }
}
