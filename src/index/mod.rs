mod chroma;
mod error;
mod service;

pub(crate) use chroma::ChromaIndex;
pub(crate) use error::IndexError;
pub(crate) use service::{IndexEntry, ScoredPassage, VectorStore};
