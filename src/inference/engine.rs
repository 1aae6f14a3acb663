use crate::{
    embedding_client::EmbeddingClientService,
    index::VectorStore,
    ingest::RetrievalResult,
    llm_client::LlmService,
};

use super::{QueryEngineError, Retriever};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Answer {
    /// Nothing cleared the score threshold; the answer collaborator was not consulted.
    NoConfidentAnswer,
    Sources(Vec<RetrievalResult>),
    Generated {
        sources: Vec<RetrievalResult>,
        answer: String,
    },
}

pub(crate) struct Engine<'a, E: EmbeddingClientService, S: VectorStore, L: LlmService> {
    retriever: Retriever<'a, E, S>,
    llm_client: Option<&'a L>,
    k: usize,
    min_score: f32,
}

impl<'a, E: EmbeddingClientService, S: VectorStore, L: LlmService> Engine<'a, E, S, L> {
    /// Without an `llm_client` only the ranked sources are returned.
    pub(crate) fn new(
        retriever: Retriever<'a, E, S>,
        llm_client: Option<&'a L>,
        k: usize,
        min_score: f32,
    ) -> Self {
        Self {
            retriever,
            llm_client,
            k,
            min_score,
        }
    }

    pub(crate) async fn ask(&self, question: &str) -> Result<Answer, QueryEngineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryEngineError::EmptyQuestion);
        }

        let sources = self.retriever.query(question, self.k, self.min_score).await?;
        log::info!("{} passages cleared score {}", sources.len(), self.min_score);
        if sources.is_empty() {
            return Ok(Answer::NoConfidentAnswer);
        }

        let Some(llm_client) = self.llm_client else {
            return Ok(Answer::Sources(sources));
        };
        let passages = sources
            .iter()
            .map(|source| source.excerpt.clone())
            .collect::<Vec<_>>();
        let answer = llm_client.answer(question, &passages).await?;
        Ok(Answer::Generated { sources, answer })
    }
}
