//! Merges segmenter and splitter output into finalized chunk records.

use tracing::{debug, warn};

use super::config::ChunkingConfig;
use super::segmenter::segment;
use super::splitter::split_with_overlap;
use super::tokenizer::token_len;
use super::types::{Chunk, ChunkingError, ChunkingOutcome, ChunkingStats, reconstruct};
use crate::documents::Document;

/// A chunk awaiting its document-wide index and total.
struct DraftChunk {
    content: String,
    heading: Option<String>,
    token_count: usize,
    overlap_bytes: usize,
    oversized: bool,
}

/// Chunks one document.
///
/// Each structural unit within the token budget becomes exactly one chunk;
/// oversized units are handed to the fallback splitter and yield one chunk
/// per window. Drafts are buffered for the whole document and finalized in
/// a second pass, once `total_chunks` is known — indices are never revised
/// after a chunk record exists.
///
/// Errors: [`ChunkingError::EmptyDocument`] for blank content (callers skip
/// the document and continue), [`ChunkingError::ReconstructionMismatch`]
/// when the emitted chunks fail to reproduce the source text byte-for-byte.
pub fn assemble(
    document: &Document,
    config: &ChunkingConfig,
) -> Result<ChunkingOutcome, ChunkingError> {
    config.validate()?;
    if document.is_empty() {
        return Err(ChunkingError::EmptyDocument {
            document_id: document.id.clone(),
        });
    }

    let units = segment(&document.content, document.kind);
    let mut drafts: Vec<DraftChunk> = Vec::new();

    for unit in &units {
        let text = unit.text(&document.content);
        let tokens = token_len(text);
        if tokens <= config.target_tokens {
            drafts.push(DraftChunk {
                content: text.to_string(),
                heading: unit.heading.clone(),
                token_count: tokens,
                overlap_bytes: 0,
                oversized: false,
            });
            continue;
        }
        // Overlap never crosses a unit boundary: the splitter runs on the
        // unit's text alone.
        for window in split_with_overlap(text, config) {
            if window.oversized {
                warn!(
                    document_id = %document.id,
                    unit_index = unit.unit_index,
                    token_count = window.token_count,
                    "emitting oversized unsplittable span whole"
                );
            }
            drafts.push(DraftChunk {
                content: text[window.start..window.end].to_string(),
                heading: unit.heading.clone(),
                token_count: window.token_count,
                overlap_bytes: window.overlap_bytes,
                oversized: window.oversized,
            });
        }
    }

    let total_chunks = drafts.len();
    let total_units = units.len();
    let mut oversized_chunks = 0usize;
    let mut token_sum = 0usize;

    let chunks: Vec<Chunk> = drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            if draft.oversized {
                oversized_chunks += 1;
            }
            token_sum += draft.token_count;
            let fingerprint = Chunk::fingerprint_of(&draft.content);
            Chunk {
                chunk_id: Chunk::id_for(&document.id, index),
                document_id: document.id.clone(),
                document_kind: document.kind,
                meeting_date: document.meeting_date,
                heading: draft.heading,
                chunk_index: index,
                total_chunks,
                content: draft.content,
                token_count: draft.token_count,
                overlap_bytes: draft.overlap_bytes,
                oversized: draft.oversized,
                fingerprint,
            }
        })
        .collect();

    if reconstruct(&chunks) != document.content {
        return Err(ChunkingError::ReconstructionMismatch {
            document_id: document.id.clone(),
        });
    }

    let stats = ChunkingStats {
        total_units,
        total_chunks,
        oversized_chunks,
        average_tokens: if total_chunks == 0 {
            0.0
        } else {
            token_sum as f32 / total_chunks as f32
        },
    };
    debug!(
        document_id = %document.id,
        units = total_units,
        chunks = total_chunks,
        oversized = oversized_chunks,
        "assembled document"
    );

    Ok(ChunkingOutcome { chunks, stats })
}
