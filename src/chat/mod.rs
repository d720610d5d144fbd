//! 聊天管线：备注分类 → 追加备注 → 组装提示词 → LLM 回复
//!
//! 对 LLM 而言每次调用都是无状态的，唯一跨消息保留的是本地累积的备注。

pub mod classify;
pub mod prompt;

use std::sync::Arc;

use crate::core::BotResult;
use crate::llm::LlmClient;
use crate::options::OptionsProvider;
use crate::session::SessionStore;

pub use classify::{classify, NoteClass, PRODUCT_TYPES};
pub use prompt::{compose_prompt, load_persona, DEFAULT_PERSONA};

/// 一条入站文本消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingText {
    pub psid: String,
    pub text: String,
}

/// 聊天管线：共享的选项源、会话存储与 LLM
pub struct ChatPipeline {
    options: Arc<dyn OptionsProvider>,
    sessions: Arc<dyn SessionStore>,
    llm: Arc<dyn LlmClient>,
    persona: String,
}

impl ChatPipeline {
    pub fn new(
        options: Arc<dyn OptionsProvider>,
        sessions: Arc<dyn SessionStore>,
        llm: Arc<dyn LlmClient>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            options,
            sessions,
            llm,
            persona: persona.into(),
        }
    }

    /// 处理一条消息并返回助手回复
    pub async fn respond(&self, incoming: &IncomingText) -> BotResult<String> {
        let options = self.options.load().await?;
        let recipes = options.recipes();

        if classify(&incoming.text, recipes).is_remark() {
            self.sessions
                .append_note(&incoming.psid, &incoming.text)
                .await;
            tracing::debug!(psid = %incoming.psid, "Remark appended to note");
        } else {
            self.sessions.get_or_create(&incoming.psid).await;
        }

        let prompt = compose_prompt(&self.persona, recipes, &incoming.text);
        self.llm.complete(&prompt).await
    }
}
