//! Pinecone-style REST index client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use super::SimilaritySearch;
use crate::config::AppConfig;
use crate::embeddings::EmbeddingClient;
use crate::embeddings::EmbeddingConfig;
use crate::errors::EventPulseError;
use crate::errors::Result;
use crate::rag::DocumentMetadata;
use crate::rag::SourceDocument;

/// Vector index reached through its `/query` endpoint
pub struct PineconeStore {
    client: Client,
    embeddings: EmbeddingClient,
    endpoint: String,
    api_key: String,
    namespace: Option<String>,
    text_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

impl PineconeStore {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EventPulseError::ConfigError(format!("Failed to build HTTP client: {e}")))?;
        let embeddings = EmbeddingClient::new(EmbeddingConfig::from_app_config(config)?)?;

        Ok(Self {
            client,
            embeddings,
            endpoint: config.vector_store.endpoint.trim_end_matches('/').to_string(),
            api_key: config.vector_store.api_key.clone(),
            namespace: config.vector_store.namespace.clone(),
            text_key: config.vector_store.text_key.clone(),
        })
    }

    async fn query(&self, vector: Vec<f32>, k: usize) -> Result<Vec<QueryMatch>> {
        let url = format!("{}/query", self.endpoint);
        debug!("Querying vector index: {} (top_k={})", url, k);

        let request = QueryRequest {
            vector,
            top_k: k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EventPulseError::RetrievalUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EventPulseError::RetrievalUnavailable(format!(
                "Vector index error ({status}): {error_text}"
            )));
        }

        let result: QueryResponse = response.json().await.map_err(|e| {
            EventPulseError::RetrievalUnavailable(format!("Failed to parse query response: {e}"))
        })?;

        Ok(result.matches)
    }
}

/// Turn raw index matches into documents, most similar first
fn matches_to_documents(
    mut matches: Vec<QueryMatch>,
    text_key: &str,
    k: usize,
) -> Vec<SourceDocument> {
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
        .into_iter()
        .take(k)
        .map(|m| {
            let mut metadata = m.metadata.unwrap_or_default();
            let page_content = match metadata.remove(text_key) {
                Some(Value::String(text)) => text,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            let source = match metadata.remove("source") {
                Some(Value::String(source)) => source,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            SourceDocument {
                page_content,
                metadata: DocumentMetadata {
                    source,
                    extra: metadata,
                },
            }
        })
        .collect()
}

#[async_trait]
impl SimilaritySearch for PineconeStore {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<SourceDocument>> {
        let vector = self.embeddings.generate(query).await?;
        let matches = self.query(vector, k).await?;
        Ok(matches_to_documents(matches, &self.text_key, k))
    }
}
