//! Embedding collaborator seam.
//!
//! The pipeline never computes vectors itself; it asks an
//! [`EmbeddingProvider`] and treats every failure as a typed error — a
//! provider must never hand back silent zero vectors.

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// Failure modes for embedding requests.
///
/// Transient failures are retried with backoff by the indexer; permanent
/// ones mark the chunk failed immediately.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request timed out: {0}")]
    Timeout(String),

    #[error("embedding provider rate limited: {0}")]
    RateLimited(String),

    #[error("embedding input rejected: {0}")]
    InvalidInput(String),

    #[error("embedding provider rejected credentials: {0}")]
    Auth(String),

    #[error("embedding provider failure: {0}")]
    Provider(String),
}

impl EmbeddingError {
    /// Whether a retry with backoff could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::RateLimited(_) | Self::Provider(_)
        )
    }
}

/// Maps chunk text to fixed-dimension vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name for logs and telemetry.
    fn name(&self) -> &str;

    /// Dimension of every vector this provider returns.
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Deterministic hash-derived embeddings for tests and offline runs.
///
/// Identical text always maps to the identical vector, and the provider
/// counts its calls so tests can assert that unchanged chunks generate no
/// embedding requests.
#[derive(Debug, Default)]
pub struct MockEmbeddingProvider {
    calls: Mutex<usize>,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `embed` calls served so far.
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn dimensions(&self) -> usize {
        8
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        *self.calls.lock() += 1;
        Ok(hash_to_vec(text))
    }
}

fn hash_to_vec(text: &str) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish();
    (0..8)
        .map(|i| {
            let bits = seed.rotate_left((i * 8) as u32) ^ ((i as u64) << 24);
            (bits as f32) / u32::MAX as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embeddings_are_deterministic() {
        let provider = MockEmbeddingProvider::new();
        let a = provider.embed("Hello board").await.unwrap();
        let b = provider.embed("Hello board").await.unwrap();
        let c = provider.embed("Goodbye board").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), provider.dimensions());
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn batch_embeds_every_input() {
        let provider = MockEmbeddingProvider::new();
        let inputs = vec!["one".to_string(), "two".to_string()];
        let vectors = provider.embed_batch(&inputs).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_ne!(vectors[0], vectors[1]);
    }

    #[test]
    fn transient_classification() {
        assert!(EmbeddingError::Timeout("t".into()).is_transient());
        assert!(EmbeddingError::RateLimited("r".into()).is_transient());
        assert!(!EmbeddingError::InvalidInput("i".into()).is_transient());
        assert!(!EmbeddingError::Auth("a".into()).is_transient());
    }
}
