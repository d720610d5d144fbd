//! Google Sheets 集成
//!
//! - 订单：`values:append` 追加一行
//! - 选项：`values.get` 读取选项表（首行为 key，每列为取值）
//!
//! 鉴权使用 OAuth Bearer 令牌（由部署方注入，令牌刷新不在本服务内处理）。

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::OrderSink;
use crate::config::SheetsSection;
use crate::core::{BotError, BotResult};
use crate::options::{OptionSet, OptionsProvider};
use crate::order::OrderRecord;

/// values.get 响应
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// values:append 请求体
#[derive(Debug, Serialize)]
struct AppendRequest<'a> {
    values: [&'a [String]; 1],
}

/// Sheets REST 客户端（单个表格）
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        spreadsheet_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
        }
    }

    /// 由配置构造；表格 ID 或令牌缺失时返回 None
    pub fn from_config(http: reqwest::Client, cfg: &SheetsSection) -> Option<Self> {
        if !cfg.is_configured() {
            return None;
        }
        Some(Self::new(
            http,
            &cfg.base_url,
            cfg.spreadsheet_id.clone().unwrap_or_default(),
            cfg.access_token.clone().unwrap_or_default(),
        ))
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}`；表格 ID 与 A1 区域作为单独路径段编码
    fn values_url(&self, range: &str, suffix: &str) -> BotResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| BotError::Config(format!("invalid sheets base_url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| BotError::Config(format!("sheets base_url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                &format!("{}{}", range, suffix),
            ]);
        Ok(url)
    }

    /// 在 range 所在表末尾追加一行
    pub async fn append_row(&self, range: &str, row: &[String]) -> BotResult<()> {
        let resp = self
            .http
            .post(self.values_url(range, ":append")?)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&self.access_token)
            .json(&AppendRequest { values: [row] })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Sheets(format!("append {}: {}", status, body)));
        }
        Ok(())
    }

    /// 读取区域内的所有单元格（按行），非字符串单元格转为文本
    pub async fn get_values(&self, range: &str) -> BotResult<Vec<Vec<String>>> {
        let resp = self
            .http
            .get(self.values_url(range, "")?)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::Sheets(format!("get {}: {}", status, body)));
        }

        let range: ValueRange = resp.json().await?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 订单记录转为表格行
pub fn order_row(record: &OrderRecord) -> Vec<String> {
    let order = &record.order;
    vec![
        record.order_id.clone(),
        record.received_at.to_rfc3339(),
        order.psid.clone(),
        order.recipe.clone(),
        order.amount.to_string(),
        order.product_type.clone(),
        order.pickup_place.clone(),
        order.pickup_time.clone(),
        order.address.clone(),
        record.note.clone(),
    ]
}

/// 订单落表
pub struct SheetsOrderSink {
    client: SheetsClient,
    range: String,
}

impl SheetsOrderSink {
    pub fn new(client: SheetsClient, range: impl Into<String>) -> Self {
        Self {
            client,
            range: range.into(),
        }
    }
}

#[async_trait]
impl OrderSink for SheetsOrderSink {
    async fn save(&self, record: &OrderRecord) -> BotResult<()> {
        self.client.append_row(&self.range, &order_row(record)).await?;
        tracing::info!(order_id = %record.order_id, "Order saved to sheet");
        Ok(())
    }
}

/// 选项表
pub struct SheetsOptionsProvider {
    client: SheetsClient,
    range: String,
}

impl SheetsOptionsProvider {
    pub fn new(client: SheetsClient, range: impl Into<String>) -> Self {
        Self {
            client,
            range: range.into(),
        }
    }
}

#[async_trait]
impl OptionsProvider for SheetsOptionsProvider {
    async fn load(&self) -> BotResult<OptionSet> {
        let rows = self
            .client
            .get_values(&self.range)
            .await
            .map_err(|e| BotError::Options(e.to_string()))?;
        Ok(OptionSet::from_columns(&rows))
    }
}
