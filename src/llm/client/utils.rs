use crate::config::{LLMConfig, LLMProvider};

/// 超过该长度的prompt交给高质量模型处理
pub const POWERFUL_MODEL_THRESHOLD: usize = 32 * 1024;

/// 根据prompt长度选择模型
pub fn evaluate_befitting_model(
    llm_config: &LLMConfig,
    system_prompt: &str,
    user_prompt: &str,
) -> String {
    if system_prompt.len() + user_prompt.len() <= POWERFUL_MODEL_THRESHOLD {
        return llm_config.model_efficient.clone();
    }
    llm_config.model_powerful.clone()
}

/// Gemini不接受空的user消息，此时补一条固定指令
pub const GEMINI_EMPTY_TURN_FILLER: &str = "Return ONLY the JSON described above.";

/// 返回实际发送的user消息
pub fn effective_user_prompt<'a>(provider: &LLMProvider, user_prompt: &'a str) -> &'a str {
    if *provider == LLMProvider::Gemini && user_prompt.trim().is_empty() {
        return GEMINI_EMPTY_TURN_FILLER;
    }
    user_prompt
}
