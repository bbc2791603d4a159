use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "gemini" => Ok(LLMProvider::Gemini),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 历史样本的检索策略
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum SampleStrategy {
    /// 基于转写文本的向量相似度检索
    #[serde(rename = "similarity")]
    #[default]
    Similarity,
    /// 基于客户身份的本地数据集级联检索
    #[serde(rename = "identity")]
    Identity,
}

impl std::fmt::Display for SampleStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleStrategy::Similarity => write!(f, "similarity"),
            SampleStrategy::Identity => write!(f, "identity"),
        }
    }
}

impl std::str::FromStr for SampleStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "similarity" => Ok(SampleStrategy::Similarity),
            "identity" => Ok(SampleStrategy::Identity),
            _ => Err(format!("Unknown sample strategy: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP服务配置
    pub server: ServerConfig,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 向量化服务配置
    pub embedding: EmbeddingConfig,

    /// 向量库配置
    pub vector_index: VectorIndexConfig,

    /// 转写服务配置
    pub transcription: TranscriptionConfig,

    /// 历史样本配置
    pub samples: SamplesConfig,

    /// 洞察存储配置
    pub store: StoreConfig,

    /// 缓存配置
    pub cache: CacheConfig,

    /// 日志配置
    pub logging: LoggingConfig,

    /// 启动时检查LLM连通性
    pub check_connection: bool,

    /// 是否启用详细日志
    pub verbose: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许任意来源的跨域请求
    pub cors_permissive: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，用于常规长度的prompt
    pub model_efficient: String,

    /// 高质量模型，用于超长prompt
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 向量化服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

/// 向量库配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct VectorIndexConfig {
    /// 索引地址，查询接口为`{host}/query`
    pub host: String,
    pub api_key: String,
    pub namespace: String,
    pub timeout_seconds: u64,
}

/// 转写服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub endpoint: String,
    pub call_type: String,
    pub module_id: String,
    /// 提交转写任务的超时（秒）
    pub timeout_seconds: u64,
    /// 下载转写文本的超时（秒）
    pub fetch_timeout_seconds: u64,
}

/// 历史样本配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SamplesConfig {
    pub strategy: SampleStrategy,
    /// 身份级联检索使用的CSV数据集
    pub dataset_path: PathBuf,
    /// 请求未携带`max_call_limit`时的默认值
    pub default_limit: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

/// 缓存配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,

    /// 缓存目录
    pub cache_dir: PathBuf,

    /// 缓存过期时间（小时）
    pub expire_hours: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// 请求日志（JSONL），为空时不记录
    pub request_log_path: Option<PathBuf>,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 服务监听地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            cors_permissive: true,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("VOICE_INSIGHTS_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.openai.com/v1"),
            model_efficient: String::from("gpt-4o-mini"),
            model_powerful: String::from("gpt-4o"),
            max_tokens: 4096,
            temperature: 0.7,
            timeout_seconds: 30,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from("https://api.openai.com"),
            api_key: std::env::var("VOICE_INSIGHTS_EMBEDDING_API_KEY").unwrap_or_default(),
            model: String::from("text-embedding-3-small"),
            timeout_seconds: 30,
        }
    }
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            api_key: std::env::var("VOICE_INSIGHTS_VECTOR_API_KEY").unwrap_or_default(),
            namespace: String::new(),
            timeout_seconds: 30,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            call_type: String::from("PNS"),
            module_id: String::from("LMS"),
            timeout_seconds: 40,
            fetch_timeout_seconds: 15,
        }
    }
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            strategy: SampleStrategy::default(),
            dataset_path: PathBuf::from("sample/sample_data.csv"),
            default_limit: 10,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("insights_data.json"),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_dir: PathBuf::from(".voice-insights/cache"),
            expire_hours: 720,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            request_log_path: Some(PathBuf::from("logs/insights_requests.jsonl")),
        }
    }
}
