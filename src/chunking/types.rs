//! Chunk records and chunking errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::documents::DocumentKind;

/// Errors raised while turning a document into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// The document carried no usable text. Callers skip and continue.
    #[error("document '{document_id}' has no usable content")]
    EmptyDocument { document_id: String },

    #[error("invalid chunking configuration: {0}")]
    InvalidConfig(String),

    /// The emitted chunks failed to reproduce the source text. This is a
    /// correctness bug, fatal to the affected document only.
    #[error("chunks for document '{document_id}' do not reconstruct its content")]
    ReconstructionMismatch { document_id: String },
}

/// One retrievable unit of document text, finalized and immutable.
///
/// Within a document, `chunk_index` values are contiguous `0..total_chunks`
/// in reading order, and stripping each chunk's `overlap_bytes` prefix then
/// concatenating contents reproduces the document exactly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic id derived from the document id and chunk index.
    pub chunk_id: String,
    pub document_id: String,
    pub document_kind: DocumentKind,
    pub meeting_date: NaiveDate,
    /// Heading of the structural unit this chunk came from, when one was
    /// recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub content: String,
    /// Estimated token length of `content`.
    pub token_count: usize,
    /// Bytes of `content` shared with the previous chunk; zero at unit
    /// starts.
    pub overlap_bytes: usize,
    /// Set when a single unsplittable span exceeded the token budget and
    /// was emitted whole rather than truncated.
    pub oversized: bool,
    /// SHA-256 hex digest of `content`, used for change detection.
    pub fingerprint: String,
}

impl Chunk {
    /// Deterministic chunk id for a document id and zero-based index.
    pub fn id_for(document_id: &str, index: usize) -> String {
        format!("{document_id}_chunk_{index:03}")
    }

    /// Stable content digest used to detect changed chunks.
    pub fn fingerprint_of(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Summary statistics for one document's chunking pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChunkingStats {
    pub total_units: usize,
    pub total_chunks: usize,
    pub oversized_chunks: usize,
    pub average_tokens: f32,
}

/// Result of chunking one document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkingOutcome {
    pub chunks: Vec<Chunk>,
    pub stats: ChunkingStats,
}

impl ChunkingOutcome {
    /// Rebuilds the source text by dropping each chunk's overlap prefix.
    pub fn reconstruct(&self) -> String {
        reconstruct(&self.chunks)
    }
}

/// Concatenates chunk contents with declared overlaps removed.
pub fn reconstruct(chunks: &[Chunk]) -> String {
    let mut out = String::new();
    for chunk in chunks {
        out.push_str(&chunk.content[chunk.overlap_bytes.min(chunk.content.len())..]);
    }
    out
}
