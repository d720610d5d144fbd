//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod deepseek;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmSection;

pub use deepseek::{create_deepseek_client, DEEPSEEK_CHAT};
pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use traits::LlmClient;

/// 按配置选择 LLM 后端
///
/// - provider = deepseek 且有 DeepSeek Key：DeepSeek
/// - provider = openai 且有 OpenAI Key：OpenAI（可配 base_url）
/// - 其余情况（含 provider = mock）：Mock
pub fn create_llm_from_config(cfg: &LlmSection) -> Arc<dyn LlmClient> {
    let provider = cfg.provider.to_lowercase();
    let timeout = Duration::from_secs(cfg.timeouts.request);

    match (provider.as_str(), &cfg.api_key, &cfg.deepseek_api_key) {
        ("deepseek", _, Some(key)) => {
            let model = if cfg.model.starts_with("deepseek") {
                cfg.model.as_str()
            } else {
                DEEPSEEK_CHAT
            };
            tracing::info!("Using DeepSeek LLM ({})", model);
            Arc::new(create_deepseek_client(key, Some(model), timeout))
        }
        ("openai", Some(key), _) => {
            tracing::info!("Using OpenAI LLM ({})", cfg.model);
            Arc::new(OpenAiClient::new(
                cfg.base_url.as_deref(),
                &cfg.model,
                key,
                timeout,
            ))
        }
        _ => {
            tracing::warn!(provider = %cfg.provider, "No API key set or provider unknown, using Mock LLM");
            Arc::new(MockLlmClient)
        }
    }
}
