use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheManager;
use crate::config::EmbeddingConfig;
use crate::error::InsightError;

/// 文本向量化服务
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, InsightError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI兼容的`/v1/embeddings`接口
pub struct HttpEmbedder {
    http: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(http: reqwest::Client, config: EmbeddingConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/embeddings",
            self.config.api_base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, InsightError> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| InsightError::Embedding(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InsightError::Embedding(e.to_string()))?;
        if !status.is_success() {
            return Err(InsightError::Embedding(format!("HTTP {}: {}", status, body)));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| InsightError::Embedding(format!("invalid response body: {}", e)))?;
        if let Some(error) = parsed.error.filter(|e| !e.is_null()) {
            return Err(InsightError::Embedding(error.to_string()));
        }

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| InsightError::Embedding("no embedding returned".to_string()))
    }
}

/// 带磁盘缓存的向量化服务，缓存读写失败时直接回源
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    cache: CacheManager,
    model: String,
}

const EMBEDDING_CACHE_CATEGORY: &str = "embeddings";

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, cache: CacheManager, model: impl Into<String>) -> Self {
        Self {
            inner,
            cache,
            model: model.into(),
        }
    }

    fn cache_key(&self, text: &str) -> String {
        format!("{}\n{}", self.model, text)
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, InsightError> {
        let key = self.cache_key(text);
        if let Some(vector) = self
            .cache
            .get::<Vec<f32>>(EMBEDDING_CACHE_CATEGORY, &key)
            .await
        {
            return Ok(vector);
        }

        let vector = self.inner.embed(text).await?;
        if let Err(e) = self
            .cache
            .set(EMBEDDING_CACHE_CATEGORY, &key, &vector)
            .await
        {
            tracing::warn!(error = %e, "failed to write embedding cache");
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use mockito::{Matcher, Server};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn config(base_url: String) -> EmbeddingConfig {
        EmbeddingConfig {
            api_base_url: base_url,
            api_key: "embed-key".to_string(),
            model: "test-embedding".to_string(),
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn test_embed_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/embeddings")
            .match_header("authorization", "Bearer embed-key")
            .match_body(Matcher::Json(serde_json::json!({
                "model": "test-embedding",
                "input": "renewal question"
            })))
            .with_status(200)
            .with_body(r#"{"data":[{"embedding":[0.25,0.5,0.75]}]}"#)
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(reqwest::Client::new(), config(server.url()));
        let vector = embedder.embed("renewal question").await.unwrap();

        assert_eq!(vector, vec![0.25, 0.5, 0.75]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_error_field() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_body(r#"{"error":{"message":"quota exceeded"}}"#)
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(reqwest::Client::new(), config(server.url()));
        let err = embedder.embed("x").await.unwrap_err();

        assert!(matches!(err, InsightError::Embedding(ref m) if m.contains("quota exceeded")));
    }

    #[tokio::test]
    async fn test_embed_http_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(reqwest::Client::new(), config(server.url()));
        let err = embedder.embed("x").await.unwrap_err();

        assert!(err.is_service_failure());
    }

    #[tokio::test]
    async fn test_embed_empty_data() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let embedder = HttpEmbedder::new(reqwest::Client::new(), config(server.url()));
        assert!(embedder.embed("x").await.is_err());
    }

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, InsightError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32])
        }
    }

    #[tokio::test]
    async fn test_cached_embedder_skips_second_call() {
        let dir = TempDir::new().unwrap();
        let inner = Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
        });
        let cache = CacheManager::new(CacheConfig {
            enabled: true,
            cache_dir: dir.path().to_path_buf(),
            expire_hours: 1,
        });
        let embedder = CachedEmbedder::new(inner.clone(), cache, "test-embedding");

        assert_eq!(embedder.embed("hello").await.unwrap(), vec![5.0]);
        assert_eq!(embedder.embed("hello").await.unwrap(), vec![5.0]);
        assert_eq!(embedder.embed("hi").await.unwrap(), vec![2.0]);

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(embedder.cache().stats().hits, 1);
    }
}
