//! End-to-end orchestration: documents in, run summary out.

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::assembler::assemble;
use crate::chunking::config::ChunkingConfig;
use crate::chunking::types::ChunkingError;
use crate::documents::Document;
use crate::embeddings::EmbeddingProvider;
use crate::indexing::{IncrementalIndexer, IndexerConfig};
use crate::stores::VectorStore;

/// What one pipeline run did, for whoever orchestrates ingestion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents_processed: usize,
    pub documents_skipped: usize,
    pub documents_failed: usize,
    pub chunks_new: usize,
    pub chunks_changed: usize,
    pub chunks_unchanged: usize,
    pub chunks_failed: usize,
    pub failed_chunk_ids: Vec<String>,
    pub fatal_errors: Vec<String>,
}

/// Chunks and indexes batches of documents.
///
/// Documents are independent units of work: an empty document is skipped,
/// a chunking failure (including a reconstruction mismatch) fails only
/// that document, and chunk-level indexing failures are carried in the
/// summary without aborting anything. Chunk numbering for a document
/// always completes inside its own `assemble` call, so nothing here
/// prevents callers from running several pipelines over disjoint document
/// sets concurrently.
pub struct IngestPipeline {
    config: ChunkingConfig,
    indexer: IncrementalIndexer,
}

impl IngestPipeline {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            config: ChunkingConfig::default(),
            indexer: IncrementalIndexer::new(embedder, store),
        }
    }

    #[must_use]
    pub fn with_chunking_config(mut self, config: ChunkingConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_indexer_config(mut self, config: IndexerConfig) -> Self {
        self.indexer = self.indexer.with_config(config);
        self
    }

    /// Processes each document in order and returns the run summary.
    pub async fn run(&self, documents: &[Document]) -> RunSummary {
        let mut summary = RunSummary::default();

        for document in documents {
            let outcome = match assemble(document, &self.config) {
                Ok(outcome) => outcome,
                Err(ChunkingError::EmptyDocument { document_id }) => {
                    info!(document_id = %document_id, "skipping empty document");
                    summary.documents_skipped += 1;
                    continue;
                }
                Err(err) => {
                    error!(document_id = %document.id, error = %err, "document failed chunking");
                    summary.documents_failed += 1;
                    summary.fatal_errors.push(err.to_string());
                    continue;
                }
            };

            match self.indexer.index_chunks(outcome.chunks).await {
                Ok(report) => {
                    summary.documents_processed += 1;
                    summary.chunks_new += report.new;
                    summary.chunks_changed += report.changed;
                    summary.chunks_unchanged += report.unchanged;
                    summary.chunks_failed += report.failed;
                    summary.failed_chunk_ids.extend(report.failed_chunk_ids);
                }
                Err(err) => {
                    error!(document_id = %document.id, error = %err, "document failed indexing");
                    summary.documents_failed += 1;
                    summary.fatal_errors.push(err.to_string());
                }
            }
        }

        info!(
            processed = summary.documents_processed,
            skipped = summary.documents_skipped,
            failed = summary.documents_failed,
            chunks_new = summary.chunks_new,
            chunks_changed = summary.chunks_changed,
            chunks_unchanged = summary.chunks_unchanged,
            chunks_failed = summary.chunks_failed,
            "pipeline run complete"
        );
        summary
    }
}
