//! Vector index integration
//!
//! This module defines the store capability the core depends on
//! ([`VectorIndex`]), the REST implementation of it, and the batching layer
//! that bounds upsert request sizes.

mod batcher;
mod rest;
mod traits;

pub use batcher::{BatchStats, RecordBatcher};
pub use rest::RestIndex;
pub use traits::{
    record_id, EmbeddingRecord, IndexEntry, IndexError, IndexResult, ListPage, RecordMetadata,
    VectorIndex,
};
