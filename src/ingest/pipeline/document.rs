use std::path::PathBuf;

/// One `<page>` as it came out of the dump, before any markup processing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RawPage {
    pub(crate) title: String,
    pub(crate) markup: String,
}

/// A normalized article, persisted as one plain-text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArticleRecord {
    pub(crate) title: String,
    pub(crate) plain_text: String,
    pub(crate) source_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Chunk {
    pub(crate) text: String,
    pub(crate) source_title: String,
    pub(crate) source_path: PathBuf,
    pub(crate) sequence_index: usize,
}

impl Chunk {
    /// Stable across runs: the article file stem and the position inside the article.
    pub(crate) fn id(&self) -> String {
        let stem = self
            .source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source_title.replace(' ', "_"));
        format!("{stem}:{}", self.sequence_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexBatch {
    pub(crate) index: usize,
    pub(crate) chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RetrievalResult {
    pub(crate) excerpt: String,
    pub(crate) source_title: String,
    pub(crate) score: f32,
}
