//! Breadth-first crawl frontier
//!
//! The frontier is a FIFO queue of URLs still to visit plus the set of URLs
//! already visited. URLs are marked visited when they are dequeued, before
//! rendering, so a page that fails is never attempted twice in one crawl.
//! An entry is enqueued at most once; fragment variants are collapsed by
//! normalization before they reach [`Frontier::push`]. URLs are keyed
//! without their scheme, so `http://` and `https://` variants of a page
//! share one entry.

use std::collections::{HashSet, VecDeque};
use url::{Position, Url};

/// A URL waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,

    /// Link distance from the seed (the seed itself is 0)
    pub depth: u32,
}

/// FIFO frontier with visited tracking
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,

    /// URLs handed out by [`Frontier::pop`]; never shrinks
    visited: HashSet<String>,

    /// URLs that have ever been enqueued
    enqueued: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed at depth 0
    pub fn new(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.push(seed, 0);
        frontier
    }

    /// Appends a URL unless it was already enqueued or visited
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: Url, depth: u32) -> bool {
        let key = frontier_key(&url);
        if self.visited.contains(&key) || !self.enqueued.insert(key) {
            return false;
        }

        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Dequeues the next unvisited entry and marks it visited
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.queue.pop_front() {
            if self.visited.insert(frontier_key(&entry.url)) {
                return Some(entry);
            }
            tracing::trace!("Skipping already visited {}", entry.url);
        }
        None
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&frontier_key(url))
    }

    /// Number of entries still queued
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Everything after the scheme: host, port, path and query
fn frontier_key(url: &Url) -> String {
    url[Position::BeforeUsername..].to_string()
}
