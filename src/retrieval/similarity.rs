use std::sync::Arc;

use crate::error::InsightError;
use crate::retrieval::embedding::Embedder;
use crate::retrieval::vector_index::VectorIndex;
use crate::types::SampleRecord;

/// 基于向量相似度的历史样本检索
#[derive(Clone)]
pub struct SimilarityRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl SimilarityRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// 检索与`text`最相近的`top_k`条历史通话
    ///
    /// 结果与向量库的匹配一一对应，没有元数据的匹配以占位记录代替。
    pub async fn fetch_by_similarity(
        &self,
        text: &str,
        top_k: usize,
    ) -> Result<Vec<SampleRecord>, InsightError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(text).await?;
        let matches = self.index.query(&vector, top_k).await?;
        tracing::debug!(top_k, matched = matches.len(), "vector index query done");

        Ok(matches
            .iter()
            .take(top_k)
            .map(|m| match (m.metadata_str("summary"), m.metadata_str("transcript")) {
                (Some(summary), Some(transcript)) => SampleRecord::new(transcript, summary),
                _ => SampleRecord::placeholder(),
            })
            .collect())
    }
}
