use crate::config::{Config, LLMProvider, SampleStrategy};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// 默认配置文件名，位于当前工作目录
pub const DEFAULT_CONFIG_FILE: &str = "voice-insights.toml";

/// Voice Insights - 基于历史通话样本与LLM的通话洞察服务
#[derive(Parser, Debug)]
#[command(name = "voice-insights")]
#[command(
    about = "Turns seller-support call transcripts into structured insight records and aggregates them into a quantitative executive summary."
)]
#[command(version)]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 监听地址
    #[arg(long)]
    pub host: Option<String>,

    /// 监听端口
    #[arg(short, long)]
    pub port: Option<u16>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// LLM Provider (openai, deepseek, gemini, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 高能效模型，用于常规长度的prompt
    #[arg(long)]
    pub model_efficient: Option<String>,

    /// 高质量模型，用于超长prompt
    #[arg(long)]
    pub model_powerful: Option<String>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 洞察存储文件路径
    #[arg(long)]
    pub store_path: Option<PathBuf>,

    /// 历史样本检索策略 (similarity, identity)
    #[arg(long)]
    pub sample_strategy: Option<String>,

    /// 身份级联检索使用的CSV数据集
    #[arg(long)]
    pub dataset_path: Option<PathBuf>,

    /// 是否禁用缓存
    #[arg(long)]
    pub no_cache: bool,

    /// 启动时检查LLM连通性
    #[arg(long)]
    pub check_connection: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = if let Some(config_path) = &self.config {
            // 显式指定的配置文件必须可读
            Config::from_file(config_path)?
        } else {
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(DEFAULT_CONFIG_FILE);

            if default_config_path.exists() {
                Config::from_file(&default_config_path)?
            } else {
                Config::default()
            }
        };

        // 服务配置
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            match provider_str.parse::<LLMProvider>() {
                Ok(provider) => config.llm.provider = provider,
                Err(_) => tracing::warn!(
                    provider = %provider_str,
                    keep = %config.llm.provider,
                    "unknown LLM provider, keeping configured one"
                ),
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model_efficient) = self.model_efficient {
            config.llm.model_efficient = model_efficient;
        }
        if let Some(model_powerful) = self.model_powerful {
            config.llm.model_powerful = model_powerful;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 样本与存储
        if let Some(strategy_str) = self.sample_strategy {
            match strategy_str.parse::<SampleStrategy>() {
                Ok(strategy) => config.samples.strategy = strategy,
                Err(_) => tracing::warn!(
                    strategy = %strategy_str,
                    keep = %config.samples.strategy,
                    "unknown sample strategy, keeping configured one"
                ),
            }
        }
        if let Some(dataset_path) = self.dataset_path {
            config.samples.dataset_path = dataset_path;
        }
        if let Some(store_path) = self.store_path {
            config.store.path = store_path;
        }

        // 缓存配置
        if self.no_cache {
            config.cache.enabled = false;
        }

        config.check_connection = self.check_connection;
        config.verbose = self.verbose;

        Ok(config)
    }
}

// Include tests
#[cfg(test)]
mod tests;
