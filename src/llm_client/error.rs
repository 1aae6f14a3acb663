use std::fmt::{self, Debug, Display, Formatter};

#[derive(Debug)]
pub(crate) enum LlmClientError {
    OpenAiClient(async_openai::error::OpenAIError),
    EmptyResponse,
}

impl std::error::Error for LlmClientError {}

impl From<async_openai::error::OpenAIError> for LlmClientError {
    fn from(value: async_openai::error::OpenAIError) -> Self {
        Self::OpenAiClient(value)
    }
}

impl Display for LlmClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LlmClientError::OpenAiClient(e) => write!(f, "LlmClientError: OpenAiClient: {e}"),
            LlmClientError::EmptyResponse => {
                write!(f, "LlmClientError: Empty Response from service")
            }
        }
    }
}
