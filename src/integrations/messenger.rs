//! Facebook Messenger 集成
//!
//! - Send API 客户端（回复客户）
//! - Quick Reply 结构：配方列表与两种商品类型

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{split_by_chars, ReplySender};
use crate::chat::classify::{PRODUCT_TYPES, RECIPE_PAYLOAD_PREFIX};
use crate::config::MessengerSection;
use crate::core::{BotError, BotResult};

/// Messenger 单条文本上限 2000 字符
const MAX_TEXT_CHARS: usize = 2000;
/// Quick Reply 标题上限 20 字符
pub const QUICK_REPLY_TITLE_MAX: usize = 20;

/// 单个 Quick Reply 按钮
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub content_type: String,
    pub title: String,
    pub payload: String,
}

impl QuickReply {
    /// 文本按钮，标题按字符截断到 20 个
    pub fn text(title: &str, payload: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            title: title.chars().take(QUICK_REPLY_TITLE_MAX).collect(),
            payload: payload.into(),
        }
    }
}

/// 带 Quick Reply 的消息体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReplyMessage {
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

/// 配方选择：payload 为 `RECIPE_<完整配方名>`
pub fn recipe_quick_replies(recipes: &[String]) -> QuickReplyMessage {
    QuickReplyMessage {
        text: "เลือกสูตรไส้อั่วที่ต้องการเลยครับผม 👇".to_string(),
        quick_replies: recipes
            .iter()
            .map(|r| QuickReply::text(r, format!("{}{}", RECIPE_PAYLOAD_PREFIX, r)))
            .collect(),
    }
}

/// 商品类型选择：固定两项
pub fn product_type_quick_replies() -> QuickReplyMessage {
    QuickReplyMessage {
        text: "เลือกประเภทสินค้าที่ต้องการเลยครับผม 👇".to_string(),
        quick_replies: PRODUCT_TYPES
            .iter()
            .map(|(label, payload)| QuickReply::text(label, *payload))
            .collect(),
    }
}

/// Send API 请求体
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    recipient: Recipient<'a>,
    messaging_type: &'static str,
    message: OutgoingMessage,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage {
    text: String,
}

/// Messenger Send API 客户端
pub struct MessengerClient {
    http: reqwest::Client,
    endpoint: String,
    page_access_token: String,
}

impl MessengerClient {
    pub fn new(http: reqwest::Client, cfg: &MessengerSection) -> Self {
        Self {
            http,
            endpoint: format!(
                "{}/{}/me/messages",
                cfg.graph_api_base.trim_end_matches('/'),
                cfg.api_version
            ),
            page_access_token: cfg.page_access_token.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReplySender for MessengerClient {
    async fn send_text(&self, psid: &str, text: &str) -> BotResult<()> {
        for chunk in split_by_chars(text, MAX_TEXT_CHARS) {
            let req = SendMessageRequest {
                recipient: Recipient { id: psid },
                messaging_type: "RESPONSE",
                message: OutgoingMessage { text: chunk },
            };

            let resp = self
                .http
                .post(&self.endpoint)
                .query(&[("access_token", self.page_access_token.as_str())])
                .json(&req)
                .send()
                .await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(BotError::Messenger(format!("{}: {}", status, body)));
            }
        }
        tracing::debug!(psid, "Messenger reply sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_truncated_to_twenty_chars() {
        let long = "ไส้อั่วสูตรพิเศษสมุนไพรเต็มคำ";
        assert!(long.chars().count() > 20);

        let msg = recipe_quick_replies(&[long.to_string(), "หมูธรรมดา".to_string()]);
        assert_eq!(msg.quick_replies[0].title.chars().count(), 20);
        assert!(long.starts_with(&msg.quick_replies[0].title));
        assert_eq!(msg.quick_replies[0].payload, format!("RECIPE_{}", long));
        assert_eq!(msg.quick_replies[1].title, "หมูธรรมดา");
        assert_eq!(msg.quick_replies[1].content_type, "text");
    }

    #[test]
    fn test_exactly_twenty_chars_unchanged() {
        let name = "a".repeat(20);
        assert_eq!(QuickReply::text(&name, "p").title, name);
    }

    #[test]
    fn test_product_type_replies() {
        let msg = product_type_quick_replies();
        let payloads: Vec<_> = msg.quick_replies.iter().map(|q| q.payload.as_str()).collect();
        assert_eq!(payloads, ["PRODUCT_READY", "PRODUCT_SEALED"]);
        assert_eq!(msg.quick_replies[1].title, "ซีลสุญญากาศ");
    }

    #[test]
    fn test_endpoint_from_config() {
        let cfg = MessengerSection {
            graph_api_base: "https://graph.example.com/".to_string(),
            api_version: "v19.0".to_string(),
            ..Default::default()
        };
        let client = MessengerClient::new(reqwest::Client::new(), &cfg);
        assert_eq!(client.endpoint(), "https://graph.example.com/v19.0/me/messages");
    }
}
