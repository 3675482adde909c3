//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that wires the pipeline together:
//! - Dimensionality preflight between the embedder and the index
//! - Seed resolution and frontier management
//! - Fetching, link discovery, and same-site filtering
//! - Chunking, embedding, and batched upserts
//! - The failure budget that aborts a crawl against a dead site

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::frontier::{FailureWindow, Frontier, PageState};
use crate::crawler::parser::extract_links;
use crate::embedder::EmbeddingProvider;
use crate::index::{BatchStats, EmbeddingRecord, RecordBatcher, VectorIndex};
use crate::ledger::{append_record_log, Ledger};
use crate::processor::{chunk_page, extract_text};
use crate::sources::resolve_seeds;
use crate::url::{host_of, is_excluded_asset, normalize_url, registrable_domain};
use crate::{ConfigError, SilkwormError};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Totals reported when a crawl run finishes
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Seed URLs the run started from
    pub seed_count: usize,

    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Pages whose fetch failed
    pub pages_failed: u64,

    /// Pages skipped (non-HTML responses, already-indexed seeds)
    pub pages_skipped: u64,

    /// URLs that entered the visited set
    pub urls_visited: usize,

    /// Chunks embedded and handed to the indexer
    pub chunks_indexed: u64,

    /// Chunks dropped because embedding failed
    pub chunks_skipped: u64,

    /// Upsert batching totals
    pub batches: BatchStats,
}

/// Main crawler coordinator structure
pub struct Coordinator<'a> {
    config: &'a Config,
    embedder: &'a dyn EmbeddingProvider,
    index: &'a dyn VectorIndex,
}

impl<'a> Coordinator<'a> {
    /// Creates a new coordinator over the given collaborators.
    pub fn new(
        config: &'a Config,
        embedder: &'a dyn EmbeddingProvider,
        index: &'a dyn VectorIndex,
    ) -> Self {
        Self {
            config,
            embedder,
            index,
        }
    }

    /// Runs the crawl to completion or abort.
    ///
    /// The dimensionality preflight happens before any other work: a
    /// mismatch between the embedder and the index is a configuration
    /// error, not something to discover after the first upsert.
    pub async fn run(&self) -> crate::Result<CrawlReport> {
        let index_dimension = self.index.dimension().await?;
        if index_dimension != self.embedder.dimension() {
            return Err(ConfigError::DimensionMismatch {
                embedder: self.embedder.dimension(),
                index: index_dimension,
            }
            .into());
        }

        let client = build_http_client(Duration::from_secs(
            self.config.crawler.request_timeout_secs,
        ))?;

        let seeds = resolve_seeds(&client, &self.config.sources).await?;
        let seed_count = seeds.len();

        // Seed domains are explicitly whitelisted; discovered links must
        // share a registrable domain with one of them.
        let allowed_domains: HashSet<String> = seeds
            .iter()
            .filter_map(host_of)
            .map(|host| registrable_domain(&host))
            .collect();

        let start_url = if self.config.sources.use_start_url {
            self.config
                .sources
                .start_url
                .as_deref()
                .and_then(|s| normalize_url(s).ok())
        } else {
            None
        };

        let mut ledger = Ledger::load(Path::new(&self.config.output.processed_urls_path));
        let mut frontier = Frontier::new();
        let mut window = FailureWindow::new(self.config.crawler.failure_window);
        let mut batcher = RecordBatcher::new(self.index, self.config.index.upsert_batch_size);

        let mut pages_fetched = 0u64;
        let mut pages_failed = 0u64;
        let mut pages_skipped = 0u64;
        let mut chunks_indexed = 0u64;
        let mut chunks_skipped = 0u64;

        for seed in seeds {
            // The start URL is the traversal root and is always re-crawled;
            // sitemap and manual seeds already in the ledger are done.
            let is_start = start_url.as_ref() == Some(&seed);
            if !is_start && ledger.contains(seed.as_str()) {
                tracing::debug!("Seed {} already indexed, skipping", seed);
                pages_skipped += 1;
                continue;
            }
            frontier.enqueue(seed, 0);
        }

        let mut attempts = 0usize;
        while attempts < self.config.crawler.max_pages {
            let Some(page) = frontier.next() else {
                break;
            };
            attempts += 1;

            tracing::debug!("Fetching {} (depth {})", page.url, page.depth);
            let result = fetch_url(
                &client,
                page.url.as_str(),
                self.config.crawler.fetch_retries,
            )
            .await;

            match result {
                FetchResult::Success { status_code, body } => {
                    frontier.mark(&page.url, PageState::Fetched);
                    window.record(false);
                    pages_fetched += 1;
                    tracing::debug!("Fetched {} (HTTP {})", page.url, status_code);

                    self.discover_links(
                        &body,
                        &page.url,
                        page.depth,
                        &allowed_domains,
                        &mut frontier,
                    );

                    let (indexed, skipped) = self
                        .process_page(&page.url, &body, &mut batcher)
                        .await;
                    chunks_indexed += indexed;
                    chunks_skipped += skipped;

                    frontier.mark(&page.url, PageState::Processed);
                    if indexed > 0 {
                        ledger.insert(page.url.as_str());
                    }
                }

                FetchResult::NotHtml { content_type } => {
                    tracing::info!("Skipping {} ({})", page.url, content_type);
                    frontier.mark(&page.url, PageState::FetchFailed);
                    pages_skipped += 1;
                }

                FetchResult::HttpError { status_code } => {
                    tracing::warn!("Fetch failed for {}: HTTP {}", page.url, status_code);
                    frontier.mark(&page.url, PageState::FetchFailed);
                    window.record(true);
                    pages_failed += 1;
                }

                FetchResult::NetworkError { error } => {
                    tracing::warn!("Fetch failed for {}: {}", page.url, error);
                    frontier.mark(&page.url, PageState::FetchFailed);
                    window.record(true);
                    pages_failed += 1;
                }
            }

            if window.exceeded(self.config.crawler.failure_threshold) {
                // Everything gathered so far is still indexed before the
                // run is declared dead.
                batcher.flush().await;
                self.save_ledger(&ledger);
                tracing::error!(
                    "Failure budget exceeded after {} pages ({} recent failures); aborting",
                    attempts,
                    window.failure_count()
                );
                return Err(SilkwormError::CrawlAborted {
                    failures: window.failure_count(),
                    window: window.capacity(),
                    threshold: self.config.crawler.failure_threshold,
                });
            }
        }

        batcher.flush().await;
        self.save_ledger(&ledger);

        let report = CrawlReport {
            seed_count,
            pages_fetched,
            pages_failed,
            pages_skipped,
            urls_visited: frontier.visited_count(),
            chunks_indexed,
            chunks_skipped,
            batches: batcher.stats(),
        };

        tracing::info!(
            "Crawl complete: {} pages fetched, {} failed, {} chunks indexed ({} skipped), {} records upserted",
            report.pages_fetched,
            report.pages_failed,
            report.chunks_indexed,
            report.chunks_skipped,
            report.batches.records_upserted
        );

        Ok(report)
    }

    /// Normalizes and enqueues the same-site links of a fetched page.
    fn discover_links(
        &self,
        body: &str,
        page_url: &Url,
        depth: u32,
        allowed_domains: &HashSet<String>,
        frontier: &mut Frontier,
    ) {
        if depth >= self.config.crawler.max_depth {
            return;
        }

        for link in extract_links(body, page_url) {
            let Ok(normalized) = normalize_url(link.as_str()) else {
                continue;
            };

            let Some(host) = host_of(&normalized) else {
                continue;
            };
            if !allowed_domains.contains(&registrable_domain(&host)) {
                continue;
            }

            if is_excluded_asset(&normalized, &self.config.crawler.excluded_extensions) {
                continue;
            }

            frontier.enqueue(normalized, depth + 1);
        }
    }

    /// Chunks a page, embeds each surviving chunk, and queues the records.
    ///
    /// Returns (chunks indexed, chunks skipped). An embedding failure is
    /// isolated to its chunk; the rest of the page still goes through.
    async fn process_page(
        &self,
        page_url: &Url,
        body: &str,
        batcher: &mut RecordBatcher<'_>,
    ) -> (u64, u64) {
        let text = extract_text(body);
        let chunks = chunk_page(page_url, &text, &self.config.processing);

        if chunks.is_empty() {
            tracing::info!("No chunks above minimum length for {}", page_url);
            return (0, 0);
        }

        let mut indexed = 0u64;
        let mut skipped = 0u64;

        for chunk in chunks {
            match self.embedder.embed(&chunk.text).await {
                Ok(values) => {
                    let record = EmbeddingRecord::new(
                        &chunk.source_url,
                        chunk.chunk_index,
                        chunk.text,
                        values,
                    );
                    if let Err(e) = append_record_log(
                        Path::new(&self.config.output.record_log_path),
                        &record,
                    ) {
                        tracing::warn!("Failed to append record log: {}", e);
                    }
                    batcher.push(record).await;
                    indexed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Embedding failed for {} chunk {}: {}",
                        page_url,
                        chunk.chunk_index,
                        e
                    );
                    skipped += 1;
                }
            }
        }

        (indexed, skipped)
    }

    fn save_ledger(&self, ledger: &Ledger) {
        if let Err(e) = ledger.save() {
            tracing::warn!("Failed to save processed-URL ledger: {}", e);
        }
    }
}

/// Runs the main crawl operation.
///
/// This is the single entry point the CLI uses: it wires the configured
/// collaborators through a coordinator and returns the run's totals.
pub async fn run_crawl(
    config: &Config,
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
) -> crate::Result<CrawlReport> {
    Coordinator::new(config, embedder, index).run().await
}
