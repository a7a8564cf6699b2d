//! Incremental, dedup-aware indexing of chunk batches.
//!
//! Every chunk is classified against the vector store's recorded
//! fingerprint before anything expensive happens: `unchanged` chunks are
//! skipped outright and generate no embedding request, which is where the
//! cost saving of incremental runs comes from. `new` and `changed` chunks
//! are embedded and upserted with bounded concurrency and per-chunk retry.

pub mod retry;

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::chunking::types::Chunk;
use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::stores::{StoreError, VectorStore};
use crate::types::PipelineError;

pub use retry::RetryPolicy;

/// How a chunk relates to what the store already holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkStatus {
    /// No record under this chunk id.
    New,
    /// Stored fingerprint differs from the chunk's.
    Changed,
    /// Stored fingerprint matches; nothing to do.
    Unchanged,
}

/// Per-run indexing counts surfaced to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub new: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    /// Chunk ids that failed embedding or upsert, for retry by the caller.
    pub failed_chunk_ids: Vec<String>,
}

impl IndexReport {
    pub fn merge(&mut self, other: IndexReport) {
        self.new += other.new;
        self.changed += other.changed;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
        self.failed_chunk_ids.extend(other.failed_chunk_ids);
    }
}

/// Tuning for one indexer instance.
#[derive(Clone, Debug)]
pub struct IndexerConfig {
    /// Maximum concurrent embed/upsert operations in flight.
    pub max_in_flight: usize,
    pub retry: RetryPolicy,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 4,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
enum IndexChunkError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Classifies chunks against the store and writes only what changed.
pub struct IncrementalIndexer {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: IndexerConfig,
}

impl IncrementalIndexer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            config: IndexerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: IndexerConfig) -> Self {
        self.config = config;
        self
    }

    /// Classifies one chunk against the store.
    pub async fn classify(&self, chunk: &Chunk) -> Result<ChunkStatus, StoreError> {
        match self.store.fetch_fingerprint(&chunk.chunk_id).await? {
            None => Ok(ChunkStatus::New),
            Some(stored) if stored == chunk.fingerprint => Ok(ChunkStatus::Unchanged),
            Some(_) => Ok(ChunkStatus::Changed),
        }
    }

    /// Indexes a batch of chunks.
    ///
    /// A chunk failure (embedding or upsert, after retries) is recorded and
    /// the rest of the batch proceeds. Because upserts are atomic and
    /// classification is fingerprint-driven, an interrupted run can simply
    /// be re-invoked: already-indexed chunks come back `unchanged`.
    pub async fn index_chunks(&self, chunks: Vec<Chunk>) -> Result<IndexReport, PipelineError> {
        let mut report = IndexReport::default();
        let mut pending: Vec<(Chunk, ChunkStatus)> = Vec::new();

        for chunk in chunks {
            match self.classify(&chunk).await {
                Ok(ChunkStatus::Unchanged) => {
                    debug!(chunk_id = %chunk.chunk_id, "unchanged, skipping");
                    report.unchanged += 1;
                }
                Ok(status) => pending.push((chunk, status)),
                Err(err) => {
                    warn!(chunk_id = %chunk.chunk_id, error = %err, "fingerprint lookup failed");
                    report.failed += 1;
                    report.failed_chunk_ids.push(chunk.chunk_id);
                }
            }
        }

        if pending.is_empty() {
            return Ok(report);
        }

        let pending_ids: Vec<String> = pending
            .iter()
            .map(|(chunk, _)| chunk.chunk_id.clone())
            .collect();
        let mut completed: HashSet<String> = HashSet::with_capacity(pending_ids.len());

        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let mut tasks: JoinSet<(String, ChunkStatus, Result<(), IndexChunkError>)> =
            JoinSet::new();

        for (chunk, status) in pending {
            let semaphore = Arc::clone(&semaphore);
            let embedder = Arc::clone(&self.embedder);
            let store = Arc::clone(&self.store);
            let retry = self.config.retry.clone();
            tasks.spawn(async move {
                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(err) => {
                        return (
                            chunk.chunk_id.clone(),
                            status,
                            Err(StoreError::Backend(err.to_string()).into()),
                        );
                    }
                };
                let result = index_one(embedder.as_ref(), store.as_ref(), &retry, &chunk).await;
                drop(permit);
                (chunk.chunk_id, status, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((chunk_id, status, Ok(()))) => {
                    completed.insert(chunk_id);
                    match status {
                        ChunkStatus::New => report.new += 1,
                        ChunkStatus::Changed => report.changed += 1,
                        ChunkStatus::Unchanged => report.unchanged += 1,
                    }
                }
                Ok((chunk_id, _, Err(err))) => {
                    warn!(chunk_id = %chunk_id, error = %err, "chunk failed, continuing batch");
                    completed.insert(chunk_id.clone());
                    report.failed += 1;
                    report.failed_chunk_ids.push(chunk_id);
                }
                Err(join_err) => {
                    error!(error = %join_err, "indexing task aborted");
                }
            }
        }

        // Aborted tasks never report their own id; anything still
        // outstanding failed and belongs on the caller's retry list.
        for chunk_id in pending_ids {
            if !completed.contains(&chunk_id) {
                report.failed += 1;
                report.failed_chunk_ids.push(chunk_id);
            }
        }

        info!(
            new = report.new,
            changed = report.changed,
            unchanged = report.unchanged,
            failed = report.failed,
            "indexed chunk batch"
        );
        Ok(report)
    }
}

/// Embeds and upserts one chunk, retrying transient failures per policy.
async fn index_one(
    embedder: &dyn EmbeddingProvider,
    store: &dyn VectorStore,
    retry: &RetryPolicy,
    chunk: &Chunk,
) -> Result<(), IndexChunkError> {
    let mut attempt = 0u32;
    let embedding = loop {
        attempt += 1;
        match embedder.embed(&chunk.content).await {
            Ok(vector) => break vector,
            Err(err) if err.is_transient() && attempt < retry.max_attempts => {
                warn!(
                    chunk_id = %chunk.chunk_id,
                    attempt,
                    error = %err,
                    "transient embedding failure, backing off"
                );
                sleep(retry.delay_for(attempt)).await;
            }
            Err(err) => return Err(err.into()),
        }
    };

    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match store.upsert(chunk, embedding.clone()).await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_transient() && attempt < retry.max_attempts => {
                warn!(
                    chunk_id = %chunk.chunk_id,
                    attempt,
                    error = %err,
                    "transient upsert failure, backing off"
                );
                sleep(retry.delay_for(attempt)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
