//! Vector index trait and record types
//!
//! The pipeline and the quality scanner depend only on the operation shapes
//! defined here; `RestIndex` is the production implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from the vector index collaborator
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Index API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed index response: {0}")]
    MalformedResponse(String),
}

/// Result type for index operations
pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// Metadata stored alongside every vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordMetadata {
    /// Normalized source page URL
    pub url: String,

    /// Chunk text the vector was generated from
    pub text: String,

    /// Position of the chunk within its page
    pub chunk_index: usize,
}

/// A vector ready to be upserted, keyed by a deterministic id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

impl EmbeddingRecord {
    /// Builds a record for a chunk and its embedding vector.
    pub fn new(url: &str, chunk_index: usize, text: String, values: Vec<f32>) -> Self {
        Self {
            id: record_id(url, chunk_index),
            values,
            metadata: RecordMetadata {
                url: url.to_string(),
                text,
                chunk_index,
            },
        }
    }
}

/// Derives the record id for a (url, chunk_index) pair.
///
/// The id is a truncated SHA-256 digest, so re-indexing the same page
/// produces the same ids and upserts overwrite instead of duplicating.
pub fn record_id(url: &str, chunk_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"#");
    hasher.update(chunk_index.to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..32].to_string()
}

/// An entry read back from the index during a scan.
///
/// Metadata is kept loosely typed: the scanner's whole job is to judge
/// entries whose metadata may not match the expected shape.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexEntry {
    pub id: String,

    #[serde(default)]
    pub values: Vec<f32>,

    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// One page of ids from the index listing
#[derive(Debug, Clone)]
pub struct ListPage {
    pub ids: Vec<String>,
    pub next: Option<String>,
}

/// The vector store capability the core depends on
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Configured dimensionality of the index.
    async fn dimension(&self) -> IndexResult<usize>;

    /// Inserts or overwrites a batch of records, keyed by id.
    async fn upsert(&self, records: &[EmbeddingRecord]) -> IndexResult<()>;

    /// Returns one page of ids and the cursor for the next page.
    ///
    /// The cursor is a stable token; deletions between pages must not shift
    /// entries under the page boundary.
    async fn list_page(&self, cursor: Option<&str>, limit: usize) -> IndexResult<ListPage>;

    /// Fetches full entries (values and metadata) for the given ids.
    async fn fetch(&self, ids: &[String]) -> IndexResult<Vec<IndexEntry>>;

    /// Deletes the given ids.
    async fn delete(&self, ids: &[String]) -> IndexResult<()>;
}
