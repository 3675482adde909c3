use serde::Deserialize;

/// Main configuration structure for Silkworm
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Seed URL sources; each source is independently toggleable
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    /// Crawl outward from a single start URL
    #[serde(rename = "use-start-url", default)]
    pub use_start_url: bool,

    #[serde(rename = "start-url", default)]
    pub start_url: Option<String>,

    /// Seed from the `<loc>` entries of a sitemap
    #[serde(rename = "use-sitemap", default)]
    pub use_sitemap: bool,

    #[serde(rename = "sitemap-url", default)]
    pub sitemap_url: Option<String>,

    /// Seed from a manually supplied URL list
    #[serde(rename = "use-manual-urls", default)]
    pub use_manual_urls: bool,

    /// Entries may be single URLs or comma-separated groups
    #[serde(rename = "manual-urls", default)]
    pub manual_urls: Vec<String>,
}

impl SourcesConfig {
    /// Number of enabled seed sources
    pub fn enabled_count(&self) -> usize {
        [self.use_start_url, self.use_sitemap, self.use_manual_urls]
            .iter()
            .filter(|enabled| **enabled)
            .count()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages to fetch in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seed set
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Attempts per URL before it counts as a fetch failure
    #[serde(rename = "fetch-retries", default = "default_fetch_retries")]
    pub fetch_retries: usize,

    /// Number of recent fetch attempts tracked by the failure budget
    #[serde(rename = "failure-window", default = "default_failure_window")]
    pub failure_window: usize,

    /// Failure rate over the window that aborts the crawl, in (0, 1]
    #[serde(rename = "failure-threshold", default = "default_failure_threshold")]
    pub failure_threshold: f64,

    /// Path extensions that are never fetched (non-HTML assets)
    #[serde(rename = "excluded-extensions", default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            request_timeout_secs: default_request_timeout(),
            fetch_retries: default_fetch_retries(),
            failure_window: default_failure_window(),
            failure_threshold: default_failure_threshold(),
            excluded_extensions: default_excluded_extensions(),
        }
    }
}

/// Text extraction and chunking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Chunk window size in characters
    #[serde(rename = "chunk-size", default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters of overlap between consecutive chunks
    #[serde(rename = "chunk-overlap", default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks shorter than this (after trimming) are dropped
    #[serde(rename = "min-text-length", default = "default_min_text_length")]
    pub min_text_length: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_text_length: default_min_text_length(),
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embeddings endpoint
    pub endpoint: String,

    /// Model identifier sent with every request
    #[serde(default = "default_embed_model")]
    pub model: String,

    /// Expected vector dimensionality
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_embedding_key_env")]
    pub api_key_env: String,

    /// Attempts per chunk before the chunk is skipped
    #[serde(rename = "max-retries", default = "default_embed_retries")]
    pub max_retries: usize,
}

/// Vector index configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the vector index REST endpoint
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_index_key_env")]
    pub api_key_env: String,

    /// Records accumulated before an upsert call
    #[serde(rename = "upsert-batch-size", default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,
}

/// Quality scan configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    /// Entries requested per index page
    #[serde(rename = "scan-batch-size", default = "default_scan_batch_size")]
    pub scan_batch_size: usize,

    /// Defective ids accumulated before a delete call
    #[serde(rename = "delete-batch-size", default = "default_delete_batch_size")]
    pub delete_batch_size: usize,

    /// Hard cap on scan iterations; hitting it reports an incomplete scan
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Vectors whose L1 norm falls below this are defective
    #[serde(rename = "near-zero-epsilon", default = "default_near_zero_epsilon")]
    pub near_zero_epsilon: f32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            scan_batch_size: default_scan_batch_size(),
            delete_batch_size: default_delete_batch_size(),
            max_iterations: default_max_iterations(),
            near_zero_epsilon: default_near_zero_epsilon(),
        }
    }
}

/// Local output paths
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Ledger of URLs already indexed (skipped on later runs)
    #[serde(rename = "processed-urls-path", default = "default_processed_urls_path")]
    pub processed_urls_path: String,

    /// JSONL log of every record upserted
    #[serde(rename = "record-log-path", default = "default_record_log_path")]
    pub record_log_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            processed_urls_path: default_processed_urls_path(),
            record_log_path: default_record_log_path(),
        }
    }
}

fn default_max_pages() -> usize {
    500
}

fn default_max_depth() -> u32 {
    3
}

fn default_request_timeout() -> u64 {
    10
}

fn default_fetch_retries() -> usize {
    3
}

fn default_failure_window() -> usize {
    20
}

fn default_failure_threshold() -> f64 {
    0.8
}

fn default_excluded_extensions() -> Vec<String> {
    [
        "jpg", "jpeg", "png", "gif", "svg", "webp", "ico", "css", "js", "mp3", "mp4", "avi",
        "mov", "zip", "tar", "gz", "rar", "woff", "woff2", "ttf", "eot", "pdf",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_min_text_length() -> usize {
    50
}

fn default_embed_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimension() -> usize {
    1536
}

fn default_embedding_key_env() -> String {
    "EMBEDDING_API_KEY".to_string()
}

fn default_index_key_env() -> String {
    "VECTOR_INDEX_API_KEY".to_string()
}

fn default_processed_urls_path() -> String {
    "processed_urls.json".to_string()
}

fn default_record_log_path() -> String {
    "processed_data.jsonl".to_string()
}

fn default_embed_retries() -> usize {
    3
}

fn default_upsert_batch_size() -> usize {
    50
}

fn default_scan_batch_size() -> usize {
    1000
}

fn default_delete_batch_size() -> usize {
    100
}

fn default_max_iterations() -> u32 {
    100
}

fn default_near_zero_epsilon() -> f32 {
    1e-6
}
