//! 外部集成：Messenger（回复客户）、Google Sheets（订单落表 / 选项表）、LINE（员工通知）
//!
//! 每个外部依赖对应一个 trait，统一返回 `BotResult`，下单流程与 Webhook 分发可用假实现测试。

pub mod line;
pub mod messenger;
pub mod sheets;

use std::time::Duration;

use async_trait::async_trait;

use crate::core::BotResult;
use crate::order::OrderRecord;

pub use line::LineNotifier;
pub use messenger::MessengerClient;
pub use sheets::{SheetsClient, SheetsOptionsProvider, SheetsOrderSink};

/// 向客户发送文本消息
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_text(&self, psid: &str, text: &str) -> BotResult<()>;
}

/// 订单持久化
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn save(&self, record: &OrderRecord) -> BotResult<()>;
}

/// 员工通知
#[async_trait]
pub trait StaffNotifier: Send + Sync {
    async fn notify(&self, record: &OrderRecord) -> BotResult<()>;
}

/// 对外 HTTP 调用共用的 reqwest 客户端
pub fn build_http_client(timeout_secs: u64) -> BotResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// 按字符切分长文本（各平台对单条消息长度有限制）
pub(crate) fn split_by_chars(body: &str, max_len: usize) -> Vec<String> {
    if body.chars().count() <= max_len {
        return vec![body.to_string()];
    }
    body.chars()
        .collect::<Vec<_>>()
        .chunks(max_len)
        .map(|c| c.iter().collect())
        .collect()
}
