use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};

use super::{EmbeddingClientService, EmbeddingServiceError};

/// Any OpenAI compatible `/embeddings` endpoint.
pub(crate) struct EmbeddingClient {
    embedding_client: Client<OpenAIConfig>,
    embedding_model_name: String,
}

impl EmbeddingClient {
    pub(crate) fn new(embedding_client: Client<OpenAIConfig>, embedding_model_name: String) -> Self {
        EmbeddingClient {
            embedding_client,
            embedding_model_name,
        }
    }
}

impl EmbeddingClientService for EmbeddingClient {
    async fn embed_batch(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
        let expected = texts.len();
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model_name)
            .input(texts)
            .build()?;

        let response = self.embedding_client.embeddings().create(request).await?;

        if response.data.len() != expected {
            return Err(EmbeddingServiceError::EmbeddingSizeMismatch(
                expected,
                response.data.len(),
            ));
        }
        let mut data = response.data;
        data.sort_by_key(|embedding| embedding.index);
        Ok(data
            .into_iter()
            .map(|embedding| embedding.embedding)
            .collect())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingServiceError> {
        let embeddings = self.embed_batch(vec![text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or(EmbeddingServiceError::EmbeddingSizeMismatch(1, 0))
    }
}
