//! Upstash-style vector index queries. Matches come back loosely typed;
//! the retrieval gate decides what counts as usable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One match as returned by the index, before validation. Score and
/// metadata fields may each be missing or malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMatch {
    #[allow(dead_code)]
    pub id: Option<String>,
    pub score: Option<f64>,
    #[serde(default)]
    pub metadata: Value,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, vector: &[f32], top_k: u32) -> anyhow::Result<Vec<RawMatch>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: u32,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Vec<RawMatch>,
}

pub struct UpstashVectorIndex {
    base_url: String,
    token: String,
    http_client: reqwest::Client,
}

impl UpstashVectorIndex {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url,
            token,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }
}

#[async_trait]
impl VectorIndex for UpstashVectorIndex {
    async fn query(&self, vector: &[f32], top_k: u32) -> anyhow::Result<Vec<RawMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };
        let response = self
            .http_client
            .post(self.query_url())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Vector query failed: {}", e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Vector index returned {}: {}", status, body));
        }
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse vector query response: {}", e))?;
        Ok(parsed.result)
    }
}
