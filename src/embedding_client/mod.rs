mod client;
mod error;

pub(crate) use client::EmbeddingClient;
pub(crate) use error::EmbeddingServiceError;

/// The same implementation, and the same model, must embed the corpus and the queries.
pub(crate) trait EmbeddingClientService {
    async fn embed_batch(&self, texts: Vec<String>)
        -> Result<Vec<Vec<f32>>, EmbeddingServiceError>;
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingServiceError>;
}
