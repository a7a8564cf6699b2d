//! Crate-wide error type.

use thiserror::Error;

use crate::chunking::types::ChunkingError;
use crate::embeddings::EmbeddingError;
use crate::stores::StoreError;

/// Top-level error for pipeline operations.
///
/// Layer-specific errors ([`ChunkingError`], [`EmbeddingError`],
/// [`StoreError`]) stay typed at their seams; this enum is the roll-up
/// surfaced by orchestration code and the document reader.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("chunking failed: {0}")]
    Chunking(#[from] ChunkingError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("storage failed: {0}")]
    Storage(#[from] StoreError),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::InvalidDocument(err.to_string())
    }
}
