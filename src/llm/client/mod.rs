//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::{
    config::LLMConfig,
    error::InsightError,
    llm::client::utils::{effective_user_prompt, evaluate_befitting_model},
};

mod providers;
pub mod utils;

use providers::ProviderClient;

/// 对话补全后端
///
/// 以角色区分的system与user消息为输入，返回一段文本补全。
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
    -> Result<String, InsightError>;
}

/// LLM客户端 - 进程内只创建一次，显式注入各组件
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        tracing::info!(provider = %self.config.provider, "checking LLM connection");
        match self
            .complete("You are a helpful assistant.", "Hello")
            .await
        {
            Ok(_) => {
                tracing::info!("LLM connection ok");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "LLM connection failed");
                Err(e.into())
            }
        }
    }

    /// 单轮对话，失败不重试
    async fn prompt_once(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let model = evaluate_befitting_model(&self.config, system_prompt, user_prompt);
        tracing::debug!(
            model = %model,
            prompt_bytes = system_prompt.len() + user_prompt.len(),
            "sending completion request"
        );

        let agent = self.client.create_agent(&model, system_prompt, &self.config)?;
        agent
            .prompt(effective_user_prompt(&self.config.provider, user_prompt))
            .await
    }
}

#[async_trait]
impl CompletionBackend for LLMClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, InsightError> {
        let timeout = Duration::from_secs(self.config.timeout_seconds);
        match tokio::time::timeout(timeout, self.prompt_once(system_prompt, user_prompt)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(InsightError::Completion(format!("{:#}", e))),
            Err(_) => Err(InsightError::Completion(format!(
                "no response within {}s",
                self.config.timeout_seconds
            ))),
        }
    }
}
