mod error;
mod parse;
mod processor;

pub(crate) use error::WikiMarkupProcessingError;
pub(crate) use processor::{Normalized, Rejection, WikiMarkupProcessor, DEFAULT_EXCLUDED_PREFIXES};

use crate::ingest::pipeline::document::RawPage;

/// Turns one page into an article or a rejection.
pub(crate) trait Normalize {
    fn normalize(&self, page: &RawPage) -> Result<Normalized, WikiMarkupProcessingError>;
}

pub(crate) trait Process {
    type E;
    fn process(&self, markup: &str) -> Result<String, Self::E>;
}
