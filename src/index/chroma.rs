use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use url::Url;

use super::{IndexEntry, IndexError, ScoredPassage, VectorStore};

const USER_AGENT: &str = "voyagedex/0.1.0/rust";

#[derive(Deserialize)]
struct Collection {
    id: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<&'a [f32]>,
    documents: Vec<&'a str>,
    metadatas: Vec<Value>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: [&'a [f32]; 1],
    n_results: usize,
    include: [&'static str; 3],
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    documents: Option<Vec<Vec<Option<String>>>>,
    metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,
    distances: Option<Vec<Vec<Option<f32>>>>,
}

/// A Chroma server reached over its v1 REST API, one collection in cosine space.
pub(crate) struct ChromaIndex {
    client: Client,
    collection_url: String,
}

impl ChromaIndex {
    /// Fetches the collection, creating it when it does not exist yet.
    pub(crate) async fn connect(url: &Url, collection: &str) -> Result<Self, IndexError> {
        let base = url.as_str().trim_end_matches('/').to_string();
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        let response = client
            .post(format!("{base}/api/v1/collections"))
            .json(&json!({
                "name": collection,
                "metadata": { "hnsw:space": "cosine" },
                "get_or_create": true,
            }))
            .send()
            .await?;
        let Collection { id } = checked(response).await?.json().await?;
        log::debug!("Using Chroma collection {collection} ({id})");

        Ok(Self {
            client,
            collection_url: format!("{base}/api/v1/collections/{id}"),
        })
    }
}

async fn checked(response: Response) -> Result<Response, IndexError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(IndexError::Status(status, body))
    }
}

fn metadata(entry: &IndexEntry) -> Value {
    json!({
        "source": entry.source_title,
        "path": entry.source_path.display().to_string(),
        "sequence": entry.sequence_index,
    })
}

fn passages_from_response(response: QueryResponse) -> Result<Vec<ScoredPassage>, IndexError> {
    let missing = |field: &str| IndexError::MalformedResponse(format!("missing {field}"));
    let documents = response
        .documents
        .and_then(|documents| documents.into_iter().next())
        .ok_or_else(|| missing("documents"))?;
    let metadatas = response
        .metadatas
        .and_then(|metadatas| metadatas.into_iter().next())
        .ok_or_else(|| missing("metadatas"))?;
    let distances = response
        .distances
        .and_then(|distances| distances.into_iter().next())
        .ok_or_else(|| missing("distances"))?;

    if documents.len() != distances.len() || metadatas.len() != distances.len() {
        return Err(IndexError::MalformedResponse(format!(
            "{} documents, {} metadatas, {} distances",
            documents.len(),
            metadatas.len(),
            distances.len()
        )));
    }

    Ok(documents
        .into_iter()
        .zip(metadatas)
        .zip(distances)
        .map(|((document, metadata), distance)| {
            let source_title = metadata
                .as_ref()
                .and_then(|metadata| metadata.get("source"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            ScoredPassage {
                text: document.unwrap_or_default(),
                source_title,
                score: distance.map_or(f32::NAN, |distance| 1.0 - distance),
            }
        })
        .collect())
}

impl VectorStore for ChromaIndex {
    async fn add(&self, entries: Vec<IndexEntry>) -> Result<(), IndexError> {
        if entries.is_empty() {
            return Ok(());
        }
        let request = UpsertRequest {
            ids: entries.iter().map(|entry| entry.id.as_str()).collect(),
            embeddings: entries.iter().map(|entry| entry.embedding.as_slice()).collect(),
            documents: entries.iter().map(|entry| entry.text.as_str()).collect(),
            metadatas: entries.iter().map(metadata).collect(),
        };
        let response = self
            .client
            .post(format!("{}/upsert", self.collection_url))
            .json(&request)
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }

    async fn query(&self, embedding: Vec<f32>, k: usize) -> Result<Vec<ScoredPassage>, IndexError> {
        let request = QueryRequest {
            query_embeddings: [embedding.as_slice()],
            n_results: k,
            include: ["documents", "metadatas", "distances"],
        };
        let response = self
            .client
            .post(format!("{}/query", self.collection_url))
            .json(&request)
            .send()
            .await?;
        let response: QueryResponse = checked(response).await?.json().await?;
        passages_from_response(response)
    }
}
