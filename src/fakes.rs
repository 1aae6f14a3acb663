use std::{collections::BTreeMap, sync::Mutex};

use crate::{
    embedding_client::{EmbeddingClientService, EmbeddingServiceError},
    index::{IndexEntry, IndexError, ScoredPassage, VectorStore},
    llm_client::{LlmClientError, LlmService},
};

fn scripted_failure(remaining: &Mutex<usize>) -> bool {
    let mut remaining = remaining.lock().unwrap();
    if *remaining > 0 {
        *remaining -= 1;
        true
    } else {
        false
    }
}

/// Embeds each text as `[character count, 1.0]`.
#[derive(Default)]
pub(crate) struct FakeEmbedder {
    failures: Mutex<usize>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeEmbedder {
    pub(crate) fn failing_first(failures: usize) -> Self {
        Self {
            failures: Mutex::new(failures),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl EmbeddingClientService for FakeEmbedder {
    async fn embed_batch(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
        self.calls.lock().unwrap().push(texts.clone());
        if scripted_failure(&self.failures) {
            return Err(EmbeddingServiceError::EmbeddingSizeMismatch(texts.len(), 0));
        }
        Ok(texts
            .iter()
            .map(|text| vec![text.chars().count() as f32, 1.0])
            .collect())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingServiceError> {
        let mut embeddings = self.embed_batch(vec![text.to_string()]).await?;
        Ok(embeddings.remove(0))
    }
}

/// Upserts into a map keyed by id and answers queries from a scripted ranking.
#[derive(Default)]
pub(crate) struct FakeStore {
    failures: Mutex<usize>,
    entries: Mutex<BTreeMap<String, IndexEntry>>,
    add_calls: Mutex<Vec<Vec<String>>>,
    ranking: Mutex<Vec<ScoredPassage>>,
    queries: Mutex<Vec<usize>>,
}

impl FakeStore {
    pub(crate) fn failing_first(failures: usize) -> Self {
        Self {
            failures: Mutex::new(failures),
            ..Self::default()
        }
    }

    pub(crate) fn ranked(passages: Vec<ScoredPassage>) -> Self {
        Self {
            ranking: Mutex::new(passages),
            ..Self::default()
        }
    }

    pub(crate) fn add_calls(&self) -> Vec<Vec<String>> {
        self.add_calls.lock().unwrap().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// The `k` of every query received.
    pub(crate) fn queries(&self) -> Vec<usize> {
        self.queries.lock().unwrap().clone()
    }
}

impl VectorStore for FakeStore {
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<(), IndexError> {
        if scripted_failure(&self.failures) {
            return Err(IndexError::MalformedResponse(String::from("scripted failure")));
        }
        self.add_calls
            .lock()
            .unwrap()
            .push(entries.iter().map(|entry| entry.id.clone()).collect());
        let mut stored = self.entries.lock().unwrap();
        for entry in entries {
            stored.insert(entry.id.clone(), entry);
        }
        Ok(())
    }

    async fn query(&self, _embedding: Vec<f32>, k: usize) -> Result<Vec<ScoredPassage>, IndexError> {
        self.queries.lock().unwrap().push(k);
        Ok(self.ranking.lock().unwrap().iter().take(k).cloned().collect())
    }
}

/// Answers with the number of passages it was given and records the prompts.
#[derive(Default)]
pub(crate) struct FakeLlm {
    prompts: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeLlm {
    pub(crate) fn prompts(&self) -> Vec<(String, Vec<String>)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl LlmService for FakeLlm {
    async fn answer(&self, question: &str, passages: &[String]) -> Result<String, LlmClientError> {
        self.prompts
            .lock()
            .unwrap()
            .push((question.to_string(), passages.to_vec()));
        Ok(format!("answered from {} passages", passages.len()))
    }
}
