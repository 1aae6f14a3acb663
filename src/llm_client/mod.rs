mod error;
mod openai;

pub(crate) use error::LlmClientError;
pub(crate) use openai::OpenAiChatClient;

/// Answer generation from ranked passages.
pub(crate) trait LlmService {
    /// `passages` arrive best first and are used exactly as given.
    async fn answer(&self, question: &str, passages: &[String]) -> Result<String, LlmClientError>;
}
