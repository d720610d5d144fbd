//! Messenger Webhook：校验握手与事件分发
//!
//! Meta 要求 Webhook 尽快返回 200，否则会重试投递。
//! 本模块解析事件后立即确认，文本消息在后台任务中并发处理（同一用户的消息也不串行化）。

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use futures_util::future::join_all;
use serde::Deserialize;
use tokio::task::JoinHandle;

use super::AppState;
use crate::chat::IncomingText;

/// Page 订阅的事件对象标识
pub const PAGE_OBJECT: &str = "page";
/// 事件确认响应体
pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

/// Webhook 验证参数
#[derive(Debug, Deserialize)]
pub struct WebhookVerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Messenger Webhook 请求体
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEntry {
    pub id: Option<String>,
    pub time: Option<i64>,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize)]
pub struct MessagingEvent {
    pub sender: Option<Participant>,
    pub recipient: Option<Participant>,
    pub timestamp: Option<i64>,
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    pub mid: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub is_echo: bool,
}

/// 校验握手：mode 为 subscribe 且令牌与配置一致时回显 challenge
pub fn check_verification(query: &WebhookVerifyQuery, verify_token: &str) -> Option<String> {
    let token_ok = !verify_token.is_empty() && query.verify_token.as_deref() == Some(verify_token);
    if query.mode.as_deref() == Some("subscribe") && token_ok {
        Some(query.challenge.clone().unwrap_or_default())
    } else {
        None
    }
}

/// GET /webhook - Meta 验证 Webhook
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WebhookVerifyQuery>,
) -> Result<String, StatusCode> {
    match check_verification(&query, &state.verify_token) {
        Some(challenge) => {
            tracing::info!("Webhook verified");
            Ok(challenge)
        }
        None => {
            tracing::warn!(mode = ?query.mode, "Webhook verification rejected");
            Err(StatusCode::FORBIDDEN)
        }
    }
}

/// POST /webhook - 接收 Messenger 事件
pub async fn receive(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WebhookPayload>,
) -> (StatusCode, &'static str) {
    if payload.object.as_deref() != Some(PAGE_OBJECT) {
        tracing::debug!(object = ?payload.object, "Webhook object is not a page, ignoring");
        return (StatusCode::NOT_FOUND, "");
    }

    let messages = extract_texts(payload);
    if !messages.is_empty() {
        tracing::info!("Webhook received {} text message(s)", messages.len());
        dispatch(state, messages);
    }

    (StatusCode::OK, EVENT_RECEIVED)
}

/// 从事件批次中取出文本消息；缺少发送者、无文本或回显事件均跳过
pub fn extract_texts(payload: WebhookPayload) -> Vec<IncomingText> {
    payload
        .entry
        .into_iter()
        .flat_map(|entry| entry.messaging)
        .filter_map(|event| {
            let Some(sender) = event.sender else {
                tracing::debug!("Messaging event without sender, skipping");
                return None;
            };
            let message = event.message?;
            if message.is_echo {
                return None;
            }
            let Some(text) = message.text else {
                tracing::debug!(psid = %sender.id, "Non-text message, skipping");
                return None;
            };
            Some(IncomingText {
                psid: sender.id,
                text,
            })
        })
        .collect()
}

/// 后台并发处理一批消息；任务登记在 `state.tasks`，关闭时等待其完成
pub fn dispatch(state: Arc<AppState>, messages: Vec<IncomingText>) -> JoinHandle<()> {
    let tasks = state.tasks.clone();
    tasks.spawn(async move {
        join_all(messages.into_iter().map(|m| handle_incoming(&state, m))).await;
    })
}

/// 单条消息：聊天管线 → 回复；管线失败时发送固定致歉文案
pub async fn handle_incoming(state: &AppState, incoming: IncomingText) {
    let reply = match state.chat.respond(&incoming).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(psid = %incoming.psid, "Chat pipeline failed: {}", e);
            state.fallback_reply.clone()
        }
    };

    if let Err(e) = state.replies.send_text(&incoming.psid, &reply).await {
        tracing::error!(psid = %incoming.psid, "Failed to send Messenger reply: {}", e);
    }
}
