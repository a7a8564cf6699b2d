//! Vector-store seam and backends.
//!
//! The pipeline talks to storage through [`VectorStore`]: an atomic upsert
//! keyed by chunk id, plus a fingerprint lookup used for change detection.
//! Similarity search and retrieval ranking belong to downstream consumers,
//! not this crate.
//!
//! Backends:
//!
//! * [`memory::MemoryVectorStore`] — in-process map for tests and small runs.
//! * [`sqlite::SqliteChunkStore`] — durable SQLite-backed store.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::chunking::types::Chunk;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteChunkStore;

/// Storage failure modes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Contention or other conditions worth retrying with backoff.
    #[error("storage backend busy: {0}")]
    Busy(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

/// Write/read interface the incremental indexer relies on.
///
/// `upsert` must be atomic: content, metadata, and embedding land together
/// or not at all, and concurrent upserts to the same chunk id resolve
/// last-writer-wins with no interleaved partial state.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or fully replaces the record for `chunk.chunk_id`.
    async fn upsert(&self, chunk: &Chunk, embedding: Vec<f32>) -> Result<(), StoreError>;

    /// Returns the stored content fingerprint for a chunk id, or `None`
    /// when the chunk has never been indexed.
    async fn fetch_fingerprint(&self, chunk_id: &str) -> Result<Option<String>, StoreError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, StoreError>;
}
