use std::fmt::{Display, Formatter, Result};

use crate::{embedding_client::EmbeddingServiceError, index::IndexError, llm_client::LlmClientError};

#[derive(Debug)]
pub(crate) enum QueryEngineError {
    EmbeddingServiceError(EmbeddingServiceError),
    IndexError(IndexError),
    LlmError(LlmClientError),
    EmptyQuestion,
}

impl From<EmbeddingServiceError> for QueryEngineError {
    fn from(value: EmbeddingServiceError) -> Self {
        Self::EmbeddingServiceError(value)
    }
}
impl From<IndexError> for QueryEngineError {
    fn from(value: IndexError) -> Self {
        Self::IndexError(value)
    }
}
impl From<LlmClientError> for QueryEngineError {
    fn from(value: LlmClientError) -> Self {
        Self::LlmError(value)
    }
}

impl std::error::Error for QueryEngineError {}

impl Display for QueryEngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            QueryEngineError::EmbeddingServiceError(err) => write!(f, "{}", err),
            QueryEngineError::IndexError(err) => write!(f, "{}", err),
            QueryEngineError::LlmError(err) => write!(f, "{}", err),
            QueryEngineError::EmptyQuestion => write!(f, "QueryEngine: Empty question"),
        }
    }
}
