//! SQLite-backed vector store.
//!
//! Chunks, their metadata, and their embeddings live in a single row, so
//! one `INSERT OR REPLACE` statement gives the atomic, last-writer-wins
//! upsert the indexer requires. Embeddings are serialized as JSON text;
//! similarity search over them is a downstream concern.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, OptionalExtension};

use super::{StoreError, VectorStore};
use crate::chunking::types::Chunk;
use crate::documents::DocumentKind;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    document_id TEXT,
    document_type TEXT,
    meeting_date TEXT,
    heading TEXT,
    chunk_index TEXT,
    total_chunks TEXT,
    token_count TEXT,
    overlap_bytes TEXT,
    oversized TEXT,
    fingerprint TEXT,
    content TEXT,
    embedding TEXT
);
CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);
";

/// One row of the `chunks` table, still in its stored TEXT form.
struct ChunkRow {
    id: String,
    document_id: String,
    document_type: String,
    meeting_date: String,
    heading: String,
    chunk_index: String,
    total_chunks: String,
    token_count: String,
    overlap_bytes: String,
    oversized: String,
    fingerprint: String,
    content: String,
    embedding: String,
}

fn parse_column<T: std::str::FromStr>(value: &str, column: &str) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err| StoreError::Backend(format!("bad {column} value '{value}': {err}")))
}

impl ChunkRow {
    /// Decodes a stored row; any malformed column is a backend error rather
    /// than a silently defaulted field.
    fn decode(self) -> Result<(Chunk, Vec<f32>), StoreError> {
        let document_kind = match self.document_type.as_str() {
            "agenda" => DocumentKind::Agenda,
            "minutes" => DocumentKind::Minutes,
            other => {
                return Err(StoreError::Backend(format!(
                    "unknown document_type '{other}'"
                )));
            }
        };
        let embedding: Vec<f32> = serde_json::from_str(&self.embedding)
            .map_err(|err| StoreError::Backend(format!("bad embedding: {err}")))?;
        let chunk = Chunk {
            chunk_id: self.id,
            document_id: self.document_id,
            document_kind,
            meeting_date: parse_column(&self.meeting_date, "meeting_date")?,
            heading: (!self.heading.is_empty()).then_some(self.heading),
            chunk_index: parse_column(&self.chunk_index, "chunk_index")?,
            total_chunks: parse_column(&self.total_chunks, "total_chunks")?,
            token_count: parse_column(&self.token_count, "token_count")?,
            overlap_bytes: parse_column(&self.overlap_bytes, "overlap_bytes")?,
            oversized: parse_column(&self.oversized, "oversized")?,
            fingerprint: self.fingerprint,
            content: self.content,
        };
        Ok((chunk, embedding))
    }
}

/// Durable [`VectorStore`] over a SQLite database file.
#[derive(Clone)]
pub struct SqliteChunkStore {
    conn: Connection,
}

impl SqliteChunkStore {
    /// Opens (creating if necessary) the database at `path` and ensures
    /// the chunk schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)
                .map_err(tokio_rusqlite::Error::Rusqlite)?;
            Ok(())
        })
        .await
        .map_err(|err| StoreError::Backend(err.to_string()))?;
        Ok(Self { conn })
    }

    /// Stored chunks for one document, ordered by chunk index.
    pub async fn chunks_for_document(
        &self,
        document_id: &str,
    ) -> Result<Vec<(Chunk, Vec<f32>)>, StoreError> {
        let document_id = document_id.to_string();
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, document_id, document_type, meeting_date, heading, \
                         chunk_index, total_chunks, token_count, overlap_bytes, oversized, \
                         fingerprint, content, embedding \
                         FROM chunks WHERE document_id = ? \
                         ORDER BY CAST(chunk_index AS INTEGER)",
                    )
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;

                let rows = stmt
                    .query_map([&document_id], |row| {
                        Ok(ChunkRow {
                            id: row.get(0)?,
                            document_id: row.get(1)?,
                            document_type: row.get(2)?,
                            meeting_date: row.get(3)?,
                            heading: row.get(4)?,
                            chunk_index: row.get(5)?,
                            total_chunks: row.get(6)?,
                            token_count: row.get(7)?,
                            overlap_bytes: row.get(8)?,
                            oversized: row.get(9)?,
                            fingerprint: row.get(10)?,
                            content: row.get(11)?,
                            embedding: row.get(12)?,
                        })
                    })
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;

                let mut records = Vec::new();
                for row in rows {
                    records.push(row.map_err(tokio_rusqlite::Error::Rusqlite)?);
                }
                Ok(records)
            })
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;

        rows.into_iter().map(ChunkRow::decode).collect()
    }
}

#[async_trait]
impl VectorStore for SqliteChunkStore {
    async fn upsert(&self, chunk: &Chunk, embedding: Vec<f32>) -> Result<(), StoreError> {
        let embedding_json = serde_json::to_string(&embedding)
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        let params: [String; 13] = [
            chunk.chunk_id.clone(),
            chunk.document_id.clone(),
            chunk.document_kind.to_string(),
            chunk.meeting_date.to_string(),
            chunk.heading.clone().unwrap_or_default(),
            chunk.chunk_index.to_string(),
            chunk.total_chunks.to_string(),
            chunk.token_count.to_string(),
            chunk.overlap_bytes.to_string(),
            chunk.oversized.to_string(),
            chunk.fingerprint.clone(),
            chunk.content.clone(),
            embedding_json,
        ];
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO chunks \
                     (id, document_id, document_type, meeting_date, heading, chunk_index, \
                      total_chunks, token_count, overlap_bytes, oversized, fingerprint, \
                      content, embedding) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params,
                )
                .map_err(tokio_rusqlite::Error::Rusqlite)?;
                Ok(())
            })
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))
    }

    async fn fetch_fingerprint(&self, chunk_id: &str) -> Result<Option<String>, StoreError> {
        let chunk_id = chunk_id.to_string();
        self.conn
            .call(move |conn| {
                let fingerprint = conn
                    .query_row(
                        "SELECT fingerprint FROM chunks WHERE id = ?",
                        [&chunk_id],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;
                Ok(fingerprint)
            })
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.conn
            .call(|conn| {
                let count: i64 = conn
                    .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
                    .map_err(tokio_rusqlite::Error::Rusqlite)?;
                Ok(count as usize)
            })
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))
    }
}
