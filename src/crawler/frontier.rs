//! Crawl frontier and per-URL state tracking
//!
//! The frontier owns the breadth-first queue and the visited set for one
//! crawl run. It is a plain value handed to one coordinator, never a
//! process-wide singleton, so concurrent runs (and tests) cannot interfere.

use std::collections::{HashMap, VecDeque};
use url::Url;

/// State of a URL within the crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Enqueued, waiting to be fetched
    Queued,

    /// Currently being fetched
    Fetching,

    /// Fetch succeeded; content not yet chunked
    Fetched,

    /// Fetch failed; permanently excluded from re-enqueue
    FetchFailed,

    /// Content chunked and handed to the embedding stage
    Processed,
}

impl PageState {
    /// Terminal states are never re-enqueued within the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::Processed)
    }
}

/// A URL waiting in the frontier with its discovery depth
#[derive(Debug, Clone)]
pub struct QueuedPage {
    pub url: Url,
    pub depth: u32,
}

/// Breadth-first frontier with an embedded visited set
pub struct Frontier {
    queue: VecDeque<QueuedPage>,
    visited: HashMap<String, PageState>,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashMap::new(),
        }
    }

    /// Enqueues a URL unless it was already seen in this run.
    ///
    /// Returns true when the URL was accepted. A URL enters the visited set
    /// the moment it is enqueued, so later discoveries of the same page are
    /// rejected no matter what state the first copy is in.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        let key = url.as_str().to_string();
        if self.visited.contains_key(&key) {
            return false;
        }
        self.visited.insert(key, PageState::Queued);
        self.queue.push_back(QueuedPage { url, depth });
        true
    }

    /// Pops the next URL in discovery order, marking it as fetching.
    pub fn next(&mut self) -> Option<QueuedPage> {
        let page = self.queue.pop_front()?;
        self.visited
            .insert(page.url.as_str().to_string(), PageState::Fetching);
        Some(page)
    }

    /// Records the state transition for a URL.
    pub fn mark(&mut self, url: &Url, state: PageState) {
        self.visited.insert(url.as_str().to_string(), state);
    }

    /// Whether the URL has been enqueued or fetched in this run.
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains_key(url.as_str())
    }

    /// Number of URLs waiting to be fetched.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total URLs ever seen by this run (queued, fetched, or failed).
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

/// Sliding window over recent fetch attempts.
///
/// Once the window is full, a failure rate at or above the threshold means
/// the site is effectively down and the crawl should stop burning requests.
pub struct FailureWindow {
    window: VecDeque<bool>,
    capacity: usize,
}

impl FailureWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Records the outcome of one fetch attempt.
    pub fn record(&mut self, failed: bool) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(failed);
    }

    /// Failures among the tracked attempts.
    pub fn failure_count(&self) -> usize {
        self.window.iter().filter(|failed| **failed).count()
    }

    /// Whether the failure rate over a full window exceeds the threshold.
    ///
    /// A window that has not filled yet never trips the budget, so short
    /// crawls with one unlucky seed are not aborted.
    pub fn exceeded(&self, threshold: f64) -> bool {
        if self.window.len() < self.capacity {
            return false;
        }
        let rate = self.failure_count() as f64 / self.window.len() as f64;
        rate >= threshold
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
