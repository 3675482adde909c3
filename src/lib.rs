//! Silkworm: a crawl-to-index pipeline for semantic search
//!
//! This crate discovers pages on a target website, extracts and chunks their
//! textual content, embeds each chunk, and upserts the resulting vectors into
//! a remote vector index. A companion scanner pages through the live index,
//! classifies defective vectors, and deletes them in batches.

pub mod cleanup;
pub mod config;
pub mod crawler;
pub mod embedder;
pub mod index;
pub mod ledger;
pub mod processor;
pub mod sources;
pub mod url;

use thiserror::Error;

/// Main error type for Silkworm operations
#[derive(Debug, Error)]
pub enum SilkwormError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Vector index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("Embedding error: {0}")]
    Embed(#[from] embedder::EmbedError),

    #[error("Seed source unavailable: {0}")]
    SourceUnavailable(String),

    #[error(
        "Crawl aborted: {failures} of the last {window} fetch attempts failed \
         (threshold {threshold})"
    )]
    CrawlAborted {
        failures: usize,
        window: usize,
        threshold: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No seed URL sources enabled; enable at least one of start-url, sitemap, or manual-urls")]
    NoSourcesEnabled,

    #[error("Embedding dimension {embedder} does not match index dimension {index}")]
    DimensionMismatch { embedder: usize, index: usize },

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Silkworm operations
pub type Result<T> = std::result::Result<T, SilkwormError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use cleanup::{ScanOutcome, ScanReport, Scanner};
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport};
pub use index::{EmbeddingRecord, VectorIndex};
pub use crate::url::{normalize_url, registrable_domain};
