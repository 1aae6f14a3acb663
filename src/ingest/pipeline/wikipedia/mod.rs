mod markup_processor;

pub(crate) use markup_processor::{
    Normalize, Normalized, Rejection, WikiMarkupProcessingError, WikiMarkupProcessor,
    DEFAULT_EXCLUDED_PREFIXES,
};
