//! In-process vector store for tests and small batches.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{StoreError, VectorStore};
use crate::chunking::types::Chunk;

/// A stored chunk together with its embedding.
#[derive(Clone, Debug)]
pub struct StoredChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Map-backed [`VectorStore`]. Clones share the same underlying state.
///
/// The whole record is swapped under one write lock, so upserts are atomic
/// and last-writer-wins per chunk id.
#[derive(Clone, Debug, Default)]
pub struct MemoryVectorStore {
    records: Arc<RwLock<HashMap<String, StoredChunk>>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one stored record, if present.
    pub fn get(&self, chunk_id: &str) -> Option<StoredChunk> {
        self.records.read().get(chunk_id).cloned()
    }

    /// Stored chunks for one document, ordered by chunk index.
    pub fn chunks_for_document(&self, document_id: &str) -> Vec<StoredChunk> {
        let mut found: Vec<StoredChunk> = self
            .records
            .read()
            .values()
            .filter(|record| record.chunk.document_id == document_id)
            .cloned()
            .collect();
        found.sort_by_key(|record| record.chunk.chunk_index);
        found
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, chunk: &Chunk, embedding: Vec<f32>) -> Result<(), StoreError> {
        self.records.write().insert(
            chunk.chunk_id.clone(),
            StoredChunk {
                chunk: chunk.clone(),
                embedding,
            },
        );
        Ok(())
    }

    async fn fetch_fingerprint(&self, chunk_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .records
            .read()
            .get(chunk_id)
            .map(|record| record.chunk.fingerprint.clone()))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::DocumentKind;
    use chrono::NaiveDate;

    fn chunk(content: &str) -> Chunk {
        Chunk {
            chunk_id: Chunk::id_for("minutes_3", 0),
            document_id: "minutes_3".into(),
            document_kind: DocumentKind::Minutes,
            meeting_date: NaiveDate::from_ymd_opt(2024, 2, 6).unwrap(),
            heading: None,
            chunk_index: 0,
            total_chunks: 1,
            content: content.to_string(),
            token_count: 4,
            overlap_bytes: 0,
            oversized: false,
            fingerprint: Chunk::fingerprint_of(content),
        }
    }

    #[tokio::test]
    async fn upsert_then_fetch_fingerprint() {
        let store = MemoryVectorStore::new();
        let c = chunk("roll call taken");
        store.upsert(&c, vec![0.1, 0.2]).await.unwrap();

        let fp = store.fetch_fingerprint(&c.chunk_id).await.unwrap();
        assert_eq!(fp.as_deref(), Some(c.fingerprint.as_str()));
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(
            store
                .fetch_fingerprint("absent_chunk")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn upsert_is_last_writer_wins() {
        let store = MemoryVectorStore::new();
        let first = chunk("original text");
        store.upsert(&first, vec![1.0]).await.unwrap();

        let second = chunk("revised text");
        store.upsert(&second, vec![2.0]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let stored = store.get(&second.chunk_id).unwrap();
        assert_eq!(stored.chunk.content, "revised text");
        assert_eq!(stored.embedding, vec![2.0]);
    }
}
