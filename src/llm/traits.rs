//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient。
//! 每次调用只发送一条 system 指令，不携带历史对话。

use async_trait::async_trait;

use crate::core::BotResult;

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 以单条 system 指令请求补全，返回首条候选的文本
    async fn complete(&self, system_prompt: &str) -> BotResult<String>;
}
