mod archive_reader;
mod batch_indexer;
mod batcher;
mod checkpoint;
mod corpus_sanitizer;
mod page_extractor;
mod recursive_text_splitter;

pub(crate) use archive_reader::ArchiveReader;
pub(crate) use batch_indexer::{BatchIndexer, IndexerSettings};
pub(crate) use checkpoint::{corpus_digest, CheckpointStore, Fingerprint};
pub(crate) use corpus_sanitizer::CorpusSanitizer;
pub(crate) use page_extractor::{ExtractorStats, PageExtractor};
pub(crate) use recursive_text_splitter::RecursiveCharacterTextSplitter;
