//! LINE 员工通知（Messaging API push）

use async_trait::async_trait;
use serde::Serialize;

use super::{split_by_chars, StaffNotifier};
use crate::config::LineSection;
use crate::core::{BotError, BotResult};
use crate::order::OrderRecord;

/// LINE 单条文本上限 5000 字符
const MAX_TEXT_CHARS: usize = 5000;

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: Vec<TextMessage>,
}

#[derive(Debug, Serialize)]
struct TextMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

/// 员工群通知文本
pub fn format_staff_message(record: &OrderRecord) -> String {
    let order = &record.order;
    let mut msg = format!(
        "🛒 ออเดอร์ใหม่ #{}\n\
         👤 PSID: {}\n\
         🥓 สูตร: {}\n\
         📦 จำนวน: {} โล\n\
         🧊 ประเภท: {}\n\
         📍 รับที่: {}\n\
         🕒 เวลา: {}\n\
         🚚 ที่อยู่: {}",
        record.short_id(),
        order.psid,
        order.recipe,
        order.amount,
        order.product_type,
        order.pickup_place,
        order.pickup_time,
        order.address,
    );
    if !record.note.is_empty() {
        msg.push_str("\n📝 หมายเหตุ: ");
        msg.push_str(&record.note);
    }
    msg
}

/// LINE push 客户端
pub struct LineNotifier {
    http: reqwest::Client,
    endpoint: String,
    channel_access_token: String,
    target_id: String,
}

impl LineNotifier {
    pub fn new(http: reqwest::Client, cfg: &LineSection) -> Self {
        Self {
            http,
            endpoint: format!("{}/v2/bot/message/push", cfg.base_url.trim_end_matches('/')),
            channel_access_token: cfg.channel_access_token.clone(),
            target_id: cfg.target_id.clone(),
        }
    }
}

#[async_trait]
impl StaffNotifier for LineNotifier {
    async fn notify(&self, record: &OrderRecord) -> BotResult<()> {
        if self.target_id.is_empty() {
            return Err(BotError::Config("line.target_id is not set".to_string()));
        }

        let messages = split_by_chars(&format_staff_message(record), MAX_TEXT_CHARS)
            .into_iter()
            .map(|text| TextMessage { kind: "text", text })
            .collect();

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.channel_access_token)
            .json(&PushRequest {
                to: &self.target_id,
                messages,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Line(format!("{}: {}", status, body)));
        }
        tracing::info!(order_id = %record.order_id, "Staff notified via LINE");
        Ok(())
    }
}
