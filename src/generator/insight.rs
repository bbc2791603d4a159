//! 调用LLM并把回复解码为洞察记录

use std::sync::Arc;

use crate::error::InsightError;
use crate::llm::CompletionBackend;
use crate::types::{InsightBatch, InsightRecord};
use crate::utils::extract_json;

/// 洞察生成器
#[derive(Clone)]
pub struct InsightGenerator {
    backend: Arc<dyn CompletionBackend>,
}

impl InsightGenerator {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// 生成一批洞察，失败不重试
    pub async fn generate_insights(
        &self,
        system_prompt: &str,
        user_query: &str,
    ) -> Result<InsightBatch, InsightError> {
        let reply = self.backend.complete(system_prompt, user_query).await?;
        let batch = decode_batch(&reply)?;
        tracing::debug!(records = batch.len(), "insight batch decoded");
        Ok(batch)
    }

    /// 生成汇总洞察，用户消息为空
    pub async fn generate_final(&self, system_prompt: &str) -> Result<InsightRecord, InsightError> {
        let reply = self.backend.complete(system_prompt, "").await?;
        decode_final(&reply)
    }
}

/// 从回复中取出`{"ensights": [...]}`并解码
pub fn decode_batch(reply: &str) -> Result<InsightBatch, InsightError> {
    let json = extract_json(reply).ok_or(InsightError::Extraction)?;
    let batch: InsightBatch =
        serde_json::from_str(json).map_err(|e| InsightError::Decode(e.to_string()))?;
    if batch.is_empty() {
        return Err(InsightError::Decode("reply contains no insight records".to_string()));
    }
    Ok(batch)
}

/// 解码汇总回复，接受批次包装或单条记录，必须恰好一条`final`
pub fn decode_final(reply: &str) -> Result<InsightRecord, InsightError> {
    let json = extract_json(reply).ok_or(InsightError::Extraction)?;
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| InsightError::Decode(e.to_string()))?;

    let mut records = if value.get("ensights").is_some() {
        serde_json::from_value::<InsightBatch>(value)
            .map_err(|e| InsightError::Decode(e.to_string()))?
            .records
    } else {
        vec![serde_json::from_value::<InsightRecord>(value)
            .map_err(|e| InsightError::Decode(e.to_string()))?]
    };

    if records.len() != 1 {
        return Err(InsightError::UnexpectedBatchSize(records.len()));
    }
    let record = records.remove(0);
    if !record.is_final() {
        return Err(InsightError::Decode(format!(
            "aggregate record tagged {} instead of final",
            record.kind
        )));
    }
    Ok(record)
}
