//! Mock LLM 客户端（未配置 API Key 时使用，也用于测试）
//!
//! 从系统提示词中取出「ลูกค้าพิมพ์ว่า」后的原文回显，便于本地跑通 Webhook 流程。

use async_trait::async_trait;

use crate::core::BotResult;
use crate::llm::LlmClient;

/// Mock 客户端：回显提示词中的用户原文
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, system_prompt: &str) -> BotResult<String> {
        let echoed = system_prompt
            .rsplit_once("ลูกค้าพิมพ์ว่า:")
            .map(|(_, rest)| rest.trim().trim_matches('"'))
            .unwrap_or(system_prompt.trim());

        Ok(format!("บ่าวน้อยได้รับข้อความแล้วครับ: {}", echoed))
    }
}
