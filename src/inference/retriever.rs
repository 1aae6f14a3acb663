use std::cmp::Ordering;

use crate::{
    embedding_client::EmbeddingClientService,
    index::{ScoredPassage, VectorStore},
    ingest::RetrievalResult,
};

use super::QueryEngineError;

/// Keeps passages scoring at least `min_score`, best first, at most `k`.
///
/// The sort is stable, so equal scores keep the order the store returned them in.
pub(crate) fn select(passages: Vec<ScoredPassage>, k: usize, min_score: f32) -> Vec<RetrievalResult> {
    let mut passing = passages
        .into_iter()
        .filter(|passage| !passage.score.is_nan() && passage.score >= min_score)
        .collect::<Vec<_>>();
    passing.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    passing.truncate(k);
    passing
        .into_iter()
        .map(|passage| RetrievalResult {
            excerpt: passage.text,
            source_title: passage.source_title,
            score: passage.score,
        })
        .collect()
}

/// Query side of the index. Only valid against a store built with the same embedder.
pub(crate) struct Retriever<'a, E: EmbeddingClientService, S: VectorStore> {
    embedder: &'a E,
    store: &'a S,
}

impl<'a, E: EmbeddingClientService, S: VectorStore> Retriever<'a, E, S> {
    pub(crate) fn new(embedder: &'a E, store: &'a S) -> Self {
        Self { embedder, store }
    }

    pub(crate) async fn query(
        &self,
        text: &str,
        k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievalResult>, QueryEngineError> {
        if k == 0 {
            return Ok(vec![]);
        }
        let embedding = self.embedder.embed(text).await?;
        let passages = self.store.query(embedding, k).await?;
        Ok(select(passages, k, min_score))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fakes::{FakeEmbedder, FakeStore};

    fn passage(title: &str, score: f32) -> ScoredPassage {
        ScoredPassage {
            text: format!("{title} text"),
            source_title: title.to_string(),
            score,
        }
    }

    #[test]
    fn results_are_filtered_sorted_and_capped() {
        let results = select(
            vec![
                passage("Lyon", 0.6),
                passage("Paris", 0.9),
                passage("Nice", 0.3),
                passage("Metz", f32::NAN),
                passage("Lille", 0.6),
                passage("Dijon", 0.7),
            ],
            3,
            0.5,
        );
        assert_eq!(
            results
                .iter()
                .map(|result| result.source_title.as_str())
                .collect::<Vec<_>>(),
            ["Paris", "Dijon", "Lyon"]
        );
        assert!(results.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert!(results.iter().all(|result| result.score >= 0.5));
    }

    #[test]
    fn ties_keep_store_order() {
        let results = select(
            vec![passage("Lyon", 0.6), passage("Lille", 0.6), passage("Nice", 0.6)],
            8,
            0.5,
        );
        assert_eq!(
            results
                .iter()
                .map(|result| result.source_title.as_str())
                .collect::<Vec<_>>(),
            ["Lyon", "Lille", "Nice"]
        );
    }

    #[tokio::test]
    async fn best_match_below_threshold_returns_nothing() {
        let embedder = FakeEmbedder::default();
        let store = FakeStore::ranked(vec![passage("Paris", 0.4)]);
        let retriever = Retriever::new(&embedder, &store);

        let results = retriever.query("Where is Paris?", 8, 0.5).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(embedder.calls(), [vec![String::from("Where is Paris?")]]);
    }

    #[tokio::test]
    async fn zero_k_skips_the_collaborators() {
        let embedder = FakeEmbedder::default();
        let store = FakeStore::ranked(vec![passage("Paris", 0.9)]);
        let retriever = Retriever::new(&embedder, &store);

        assert!(retriever.query("Paris", 0, 0.5).await.unwrap().is_empty());
        assert!(embedder.calls().is_empty());
        assert!(store.queries().is_empty());
    }

    #[tokio::test]
    async fn store_is_asked_for_k_candidates() {
        let embedder = FakeEmbedder::default();
        let store = FakeStore::ranked(vec![
            passage("Paris", 0.9),
            passage("Lyon", 0.8),
            passage("Nice", 0.7),
        ]);
        let retriever = Retriever::new(&embedder, &store);

        let results = retriever.query("France", 2, 0.5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(store.queries(), [2]);
    }
}
