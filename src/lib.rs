//! ```text
//! Extracted documents ──► documents::reader ──► Document records
//!
//! Document ──► chunking::segmenter (structural units)
//!                 │
//!                 ├─► chunking::splitter  (oversized units, overlap windows)
//!                 └─► chunking::assembler ──► ChunkingOutcome
//!
//! ChunkingOutcome ──► indexing::IncrementalIndexer ──► stores::VectorStore
//!                          │                                │
//!                          └─► embeddings::EmbeddingProvider┘
//!
//! Stored vectors ──► external retrieval & QA applications
//! ```
//!
//! `minutesmith` covers the stage between raw extracted board-meeting text
//! (agendas, minutes) and a vector store: splitting documents into
//! retrieval-sized chunks along structural boundaries, falling back to
//! overlapping windows where no structure exists, and keeping the vector
//! store in sync without re-embedding unchanged content.
//!
//! Crawling, text extraction, embedding models, similarity search, and any
//! UI live outside this crate and are reached through the
//! [`embeddings::EmbeddingProvider`] and [`stores::VectorStore`] seams.

pub mod chunking;
pub mod documents;
pub mod embeddings;
pub mod indexing;
pub mod pipeline;
pub mod stores;
pub mod types;

pub use chunking::assembler::assemble;
pub use chunking::config::ChunkingConfig;
pub use chunking::types::{Chunk, ChunkingError, ChunkingOutcome, ChunkingStats};
pub use documents::{Document, DocumentKind, DocumentMetadata};
pub use indexing::{IncrementalIndexer, IndexReport, IndexerConfig, RetryPolicy};
pub use pipeline::{IngestPipeline, RunSummary};
pub use types::PipelineError;
