//! Splits documents into retrieval-sized chunks.
//!
//! The stages in this module:
//!
//! * [`segmenter`] — structural boundary detection (agenda items, motions,
//!   headings) yielding units that tile the document.
//! * [`splitter`] — fixed-budget overlapping windows for spans without
//!   usable structure or units over the token budget.
//! * [`assembler`] — merges both into finalized [`types::Chunk`] records
//!   with contiguous indices and content fingerprints.
//! * [`tokenizer`] — token-count estimation used for budgeting.

pub mod assembler;
pub mod config;
pub mod segmenter;
pub mod splitter;
pub mod tokenizer;
pub mod types;

pub use assembler::assemble;
pub use config::ChunkingConfig;
pub use segmenter::{StructuralUnit, segment};
pub use splitter::{TextWindow, split_with_overlap};
pub use types::{Chunk, ChunkingError, ChunkingOutcome, ChunkingStats};
