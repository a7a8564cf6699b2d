//! Document model shared by the chunking and indexing stages.
//!
//! Documents are produced by an external extraction step (HTML or PDF) and
//! treated as immutable, read-only input here. The reader and archive
//! helpers live in [`reader`] and [`archive`].

pub mod archive;
pub mod reader;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use archive::ChunkArchive;
pub use reader::JsonDocumentReader;

/// The kind of board-meeting record a document was extracted from.
///
/// The variant drives boundary detection in the structural segmenter, so
/// handling is exhaustive: adding a kind is a compile-checked change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Meeting agenda with enumerated items and section headings.
    Agenda,
    /// Meeting minutes with motions, timestamps, and free-form narrative.
    Minutes,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agenda => write!(f, "agenda"),
            Self::Minutes => write!(f, "minutes"),
        }
    }
}

/// Extraction-level metadata carried through to chunks unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

/// A normalized extracted document, the unit of work for the pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier, stable across extraction runs.
    pub id: String,
    pub kind: DocumentKind,
    pub meeting_date: NaiveDate,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        kind: DocumentKind,
        meeting_date: NaiveDate,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            meeting_date,
            title: title.into(),
            content: content.into(),
            metadata: DocumentMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns `true` when the document carries no usable text.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DocumentKind::Agenda).unwrap(),
            "\"agenda\""
        );
        assert_eq!(
            serde_json::from_str::<DocumentKind>("\"minutes\"").unwrap(),
            DocumentKind::Minutes
        );
    }

    #[test]
    fn whitespace_only_content_is_empty() {
        let doc = Document::new(
            "agenda_001",
            DocumentKind::Agenda,
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            "Board Meeting",
            "  \n\t \n",
        );
        assert!(doc.is_empty());
    }

    #[test]
    fn document_round_trips_through_json() {
        let doc = Document::new(
            "minutes_042",
            DocumentKind::Minutes,
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            "Regular Meeting Minutes",
            "CALL TO ORDER\nThe meeting was called to order at 6:00 PM.",
        )
        .with_metadata(DocumentMetadata {
            page_count: Some(3),
            character_count: Some(57),
            source_path: Some("data/processed/minutes_042.json".into()),
        });

        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, doc.id);
        assert_eq!(back.kind, doc.kind);
        assert_eq!(back.metadata, doc.metadata);
        assert_eq!(back.content, doc.content);
    }
}
