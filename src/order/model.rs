//! 订单数据结构

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 数量：下单页面可能传数字，也可能传字符串（如 "1.5"）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Amount {
    fn from(n: u64) -> Self {
        Amount::Number(n.into())
    }
}

/// 下单页面提交的订单（不在本地保存）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub psid: String,
    pub recipe: String,
    pub amount: Amount,
    pub product_type: String,
    pub pickup_place: String,
    pub pickup_time: String,
    pub address: String,
}

/// 订单 + 备注：交给表格与员工通知的完整记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub order: Order,
    pub note: String,
}

impl OrderRecord {
    pub fn new(order: Order, note: impl Into<String>) -> Self {
        Self {
            order_id: Uuid::new_v4().to_string(),
            received_at: Utc::now(),
            order,
            note: note.into(),
        }
    }

    /// 订单号前 8 位，用于通知里的简短引用
    pub fn short_id(&self) -> &str {
        self.order_id.get(..8).unwrap_or(&self.order_id)
    }
}
