//! Embedding generation for content chunks
//!
//! The pipeline talks to the embedding model through the
//! [`EmbeddingProvider`] trait; [`HttpEmbedder`] is the production
//! implementation against an OpenAI-compatible embeddings endpoint.

mod http;

pub use http::HttpEmbedder;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the embedding collaborator
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed embedding response: {0}")]
    MalformedResponse(String),

    #[error("Embedding has {got} dimensions, expected {expected}")]
    Dimension { expected: usize, got: usize },

    #[error("Embedding failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: usize, last_error: String },
}

/// Result type for embedding operations
pub type EmbedResult<T> = std::result::Result<T, EmbedError>;

/// A capability that turns text into a fixed-dimension vector
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single chunk of text.
    async fn embed(&self, text: &str) -> EmbedResult<Vec<f32>>;

    /// Dimensionality of every vector this provider produces.
    fn dimension(&self) -> usize;
}
