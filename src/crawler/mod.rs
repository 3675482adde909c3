//! Crawler module for web page fetching and traversal
//!
//! This module contains the crawl side of the pipeline:
//! - HTTP fetching with retry and backoff
//! - Hyperlink extraction
//! - The breadth-first frontier and visited set
//! - The coordinator that drives fetch, chunk, embed, and upsert

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use frontier::{FailureWindow, Frontier, PageState, QueuedPage};
pub use parser::extract_links;
