use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cache::CacheManager;
use crate::config::{Config, SampleStrategy};
use crate::generator::insight::InsightGenerator;
use crate::llm::CompletionBackend;
use crate::retrieval::{
    CachedEmbedder, Embedder, HttpEmbedder, PineconeIndex, SampleDataset, SampleRetriever,
    SimilarityRetriever,
};
use crate::store::InsightStore;
use crate::transcription::{HttpTranscriber, Transcriber};

/// 流水线上下文，启动时创建一次，由所有请求共享
#[derive(Clone)]
pub struct PipelineContext {
    /// 配置
    pub config: Config,
    /// 洞察生成器
    pub generator: InsightGenerator,
    /// 历史样本检索
    pub retriever: SampleRetriever,
    /// 录音转写
    pub transcriber: Arc<dyn Transcriber>,
    /// 洞察池存储
    pub store: Arc<InsightStore>,
}

impl PipelineContext {
    /// 使用指定的补全后端，其余客户端按配置创建
    pub fn with_backend(config: Config, backend: Arc<dyn CompletionBackend>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        let retriever = match config.samples.strategy {
            SampleStrategy::Identity => {
                let dataset = SampleDataset::from_csv_path(&config.samples.dataset_path)
                    .context("Failed to load sample dataset")?;
                tracing::info!(
                    rows = dataset.len(),
                    path = %config.samples.dataset_path.display(),
                    "sample dataset loaded"
                );
                SampleRetriever::Identity(Arc::new(dataset))
            }
            SampleStrategy::Similarity => {
                let http_embedder: Arc<dyn Embedder> =
                    Arc::new(HttpEmbedder::new(http.clone(), config.embedding.clone()));
                let embedder: Arc<dyn Embedder> = if config.cache.enabled {
                    Arc::new(CachedEmbedder::new(
                        http_embedder,
                        CacheManager::new(config.cache.clone()),
                        config.embedding.model.clone(),
                    ))
                } else {
                    http_embedder
                };
                let index = Arc::new(PineconeIndex::new(
                    http.clone(),
                    config.vector_index.clone(),
                ));
                SampleRetriever::Similarity(SimilarityRetriever::new(embedder, index))
            }
        };

        let transcriber = Arc::new(HttpTranscriber::new(http, config.transcription.clone()));
        let store = Arc::new(InsightStore::new(config.store.path.clone()));

        Ok(Self {
            generator: InsightGenerator::new(backend),
            retriever,
            transcriber,
            store,
            config,
        })
    }

    /// 由现成组件组装上下文
    pub fn from_parts(
        config: Config,
        backend: Arc<dyn CompletionBackend>,
        retriever: SampleRetriever,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        let store = Arc::new(InsightStore::new(config.store.path.clone()));
        Self {
            generator: InsightGenerator::new(backend),
            retriever,
            transcriber,
            store,
            config,
        }
    }
}
