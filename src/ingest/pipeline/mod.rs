pub(crate) mod article_store;
mod document;
pub(crate) mod error;
mod processor;
pub(crate) mod steps;
pub(crate) mod wikipedia;

pub(crate) use document::RetrievalResult;
pub(crate) use processor::{ExtractSettings, PipelineProcessor};
