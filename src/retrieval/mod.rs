//! 历史样本检索

use std::sync::Arc;

use crate::error::InsightError;
use crate::types::{HistoricalSamples, RequestContext};

pub mod cascade;
pub mod embedding;
pub mod similarity;
pub mod vector_index;

pub use cascade::{DatasetRow, SampleDataset};
pub use embedding::{CachedEmbedder, Embedder, HttpEmbedder};
pub use similarity::SimilarityRetriever;
pub use vector_index::{PineconeIndex, VectorIndex, VectorMatch};

/// 按配置选定的样本检索方式
#[derive(Clone)]
pub enum SampleRetriever {
    Identity(Arc<SampleDataset>),
    Similarity(SimilarityRetriever),
}

impl SampleRetriever {
    /// 为一次请求准备历史样本
    ///
    /// 相似度检索时，每份转写文本分得`sample_limit / 转写数`条样本，至少1条。
    pub async fn collect(
        &self,
        request: &RequestContext,
    ) -> Result<HistoricalSamples, InsightError> {
        match self {
            SampleRetriever::Identity(dataset) => {
                let samples = dataset.fetch_by_identity_cascade(
                    request.customer_id,
                    &request.customer_type,
                    &request.customer_city,
                    request.sample_limit,
                );
                tracing::debug!(samples = samples.len(), "identity cascade samples selected");
                Ok(HistoricalSamples::ByIdentity(samples))
            }
            SampleRetriever::Similarity(retriever) => {
                let transcripts: Vec<&str> = (0..request.transcripts.len())
                    .filter_map(|i| request.transcript(i))
                    .collect();
                if transcripts.is_empty() {
                    return Ok(HistoricalSamples::Unavailable);
                }

                let share = per_transcript_share(request.sample_limit, transcripts.len());
                let mut groups = Vec::with_capacity(transcripts.len());
                for (index, text) in transcripts.into_iter().enumerate() {
                    let samples = retriever.fetch_by_similarity(text, share).await?;
                    tracing::debug!(
                        transcript = index + 1,
                        samples = samples.len(),
                        "similarity samples retrieved"
                    );
                    groups.push(samples);
                }
                Ok(HistoricalSamples::PerTranscript(groups))
            }
        }
    }
}

/// 每份转写文本分得的样本数
pub fn per_transcript_share(limit: usize, transcripts: usize) -> usize {
    if transcripts == 0 {
        return 0;
    }
    (limit / transcripts).max(1)
}
