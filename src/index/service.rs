use std::path::PathBuf;

use super::IndexError;

/// One chunk with its embedding, keyed by the chunk's stable id.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IndexEntry {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) embedding: Vec<f32>,
    pub(crate) source_title: String,
    pub(crate) source_path: PathBuf,
    pub(crate) sequence_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredPassage {
    pub(crate) text: String,
    pub(crate) source_title: String,
    pub(crate) score: f32,
}

pub(crate) trait VectorStore {
    /// Upsert: writing an id twice leaves one entry.
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<(), IndexError>;
    /// Best match first.
    async fn query(&self, embedding: Vec<f32>, k: usize) -> Result<Vec<ScoredPassage>, IndexError>;
}
