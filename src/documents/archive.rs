//! Serialized chunk artifacts for downstream consumers.
//!
//! Besides feeding the vector store, a run can persist each document's
//! chunks as a JSON file keyed by chunk id, so other tools can consume the
//! same records without re-chunking.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::chunking::types::{Chunk, ChunkingOutcome};
use crate::types::PipelineError;

/// One document's chunks, ready for serialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkArchive {
    pub document_id: String,
    pub chunk_count: usize,
    pub chunked_at: DateTime<Utc>,
    pub chunks: Vec<Chunk>,
}

impl ChunkArchive {
    /// Builds an archive from a chunking outcome.
    ///
    /// Returns `None` for an outcome with no chunks; empty documents have
    /// nothing worth persisting.
    pub fn from_outcome(outcome: &ChunkingOutcome) -> Option<Self> {
        let first = outcome.chunks.first()?;
        Some(Self {
            document_id: first.document_id.clone(),
            chunk_count: outcome.chunks.len(),
            chunked_at: Utc::now(),
            chunks: outcome.chunks.clone(),
        })
    }

    /// File name this archive is saved under.
    pub fn file_name(&self) -> String {
        format!("{}_chunks.json", self.document_id)
    }

    /// Writes the archive as pretty JSON under `dir`, creating the
    /// directory when needed. Returns the written path.
    pub async fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, PipelineError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| PipelineError::Io(err.to_string()))?;
        fs::write(&path, json).await?;
        Ok(path)
    }

    /// Loads a previously saved archive.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let data = fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&data)?)
    }
}
