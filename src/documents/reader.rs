//! Loads extracted document records from disk.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use super::Document;
use crate::types::PipelineError;

/// Reads `Document` records from a directory of JSON files.
///
/// Each `*.json` file holds one serialized [`Document`], as produced by the
/// external extraction step. Files are visited in sorted filename order so
/// repeated runs see the same sequence.
#[derive(Clone, Debug)]
pub struct JsonDocumentReader {
    root: PathBuf,
}

impl JsonDocumentReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads every document under the root directory.
    ///
    /// Files that fail to parse are skipped with a warning rather than
    /// aborting the whole load; a missing directory is an error.
    pub async fn load_all(&self) -> Result<Vec<Document>, PipelineError> {
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let data = fs::read_to_string(&path).await?;
            match serde_json::from_str::<Document>(&data) {
                Ok(doc) => {
                    debug!(document_id = %doc.id, path = %path.display(), "loaded document");
                    documents.push(doc);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unparseable document");
                }
            }
        }
        Ok(documents)
    }
}
