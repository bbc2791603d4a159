use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::VectorIndexConfig;
use crate::error::InsightError;

/// 向量库返回的一条匹配
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VectorMatch {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl VectorMatch {
    /// 读取字符串类型的元数据字段，缺失或类型不符时为空串
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|fields| fields.get(key).and_then(|v| v.as_str()).unwrap_or(""))
    }
}

/// 向量索引查询
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, InsightError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}

/// Pinecone数据面REST接口
pub struct PineconeIndex {
    http: reqwest::Client,
    config: VectorIndexConfig,
}

impl PineconeIndex {
    pub fn new(http: reqwest::Client, config: VectorIndexConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/query", self.config.host.trim_end_matches('/'))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, InsightError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("Api-Key", &self.config.api_key)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .json(&QueryRequest {
                vector,
                top_k,
                include_metadata: true,
                include_values: false,
                namespace: &self.config.namespace,
            })
            .send()
            .await
            .map_err(|e| InsightError::VectorIndex(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::VectorIndex(format!("HTTP {}: {}", status, body)));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| InsightError::VectorIndex(format!("invalid response body: {}", e)))?;
        Ok(parsed.matches)
    }
}
