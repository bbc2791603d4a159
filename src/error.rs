use thiserror::Error;

/// 洞察流水线的错误类型
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("embedding request failed: {0}")]
    Embedding(String),

    #[error("vector index query failed: {0}")]
    VectorIndex(String),

    #[error("completion request failed: {0}")]
    Completion(String),

    #[error("no JSON object found in model output")]
    Extraction,

    #[error("failed to decode model output: {0}")]
    Decode(String),

    #[error("expected exactly one final insight, got {0}")]
    UnexpectedBatchSize(usize),

    #[error("insight store error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("insight store is corrupt: {0}")]
    CorruptPool(String),

    #[error("No insights available to summarize")]
    EmptyPool,

    #[error("sample dataset error: {0}")]
    Dataset(String),
}

/// 面向调用方的错误分类，决定HTTP状态码与响应结构
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    ExternalService,
    Decode,
    EmptyPool,
    Internal,
}

impl InsightError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InsightError::Validation(_) => ErrorKind::Validation,
            InsightError::Transcription(_)
            | InsightError::Embedding(_)
            | InsightError::VectorIndex(_)
            | InsightError::Completion(_) => ErrorKind::ExternalService,
            InsightError::Extraction
            | InsightError::Decode(_)
            | InsightError::UnexpectedBatchSize(_) => ErrorKind::Decode,
            InsightError::EmptyPool => ErrorKind::EmptyPool,
            InsightError::Storage(_) | InsightError::CorruptPool(_) | InsightError::Dataset(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// 外部服务（转写、向量、LLM）调用失败
    pub fn is_service_failure(&self) -> bool {
        self.kind() == ErrorKind::ExternalService
    }
}
