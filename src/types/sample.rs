/// 历史通话样本，仅用于构建prompt，不做持久化
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleRecord {
    pub transcript: String,
    pub summary: String,
    /// 向量库中该条匹配没有携带元数据
    pub metadata_missing: bool,
}

impl SampleRecord {
    pub fn new(transcript: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            summary: summary.into(),
            metadata_missing: false,
        }
    }

    /// 缺少元数据时的占位记录，保持与检索结果一一对应
    pub fn placeholder() -> Self {
        Self {
            metadata_missing: true,
            ..Default::default()
        }
    }
}

/// 为一次请求准备好的历史样本
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoricalSamples {
    /// 没有任何转写文本可用于检索
    Unavailable,
    /// 相似度检索：每份转写文本对应一组样本
    PerTranscript(Vec<Vec<SampleRecord>>),
    /// 身份级联检索：按客户身份得到的一组样本
    ByIdentity(Vec<SampleRecord>),
}

impl HistoricalSamples {
    pub fn total(&self) -> usize {
        match self {
            HistoricalSamples::Unavailable => 0,
            HistoricalSamples::PerTranscript(groups) => groups.iter().map(Vec::len).sum(),
            HistoricalSamples::ByIdentity(samples) => samples.len(),
        }
    }
}
