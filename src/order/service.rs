//! 订单提交流程
//!
//! 单次同步管线：读备注 → 格式化确认消息 → 落表 → 回复客户 → 通知员工。
//! 任一步失败即中止后续步骤并返回错误；已成功的步骤不回滚。

use std::sync::Arc;

use crate::core::BotResult;
use crate::integrations::{OrderSink, ReplySender, StaffNotifier};
use crate::session::SessionStore;

use super::{format_summary, Order, OrderRecord};

/// 订单服务：持有会话存储与三个外部协作方
pub struct OrderService {
    sessions: Arc<dyn SessionStore>,
    sink: Arc<dyn OrderSink>,
    replies: Arc<dyn ReplySender>,
    notifier: Arc<dyn StaffNotifier>,
    clear_note_after_submit: bool,
    utc_offset_hours: i32,
}

impl OrderService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        sink: Arc<dyn OrderSink>,
        replies: Arc<dyn ReplySender>,
        notifier: Arc<dyn StaffNotifier>,
    ) -> Self {
        Self {
            sessions,
            sink,
            replies,
            notifier,
            clear_note_after_submit: false,
            utc_offset_hours: 7,
        }
    }

    /// 三个副作用全部成功后清空备注
    pub fn with_clear_note_after_submit(mut self, clear: bool) -> Self {
        self.clear_note_after_submit = clear;
        self
    }

    /// 确认消息中取货时间的展示时区
    pub fn with_utc_offset_hours(mut self, hours: i32) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    /// 提交订单，成功时返回交给协作方的完整记录
    pub async fn submit(&self, order: Order) -> BotResult<OrderRecord> {
        let note = self.sessions.get_note(&order.psid).await;
        let summary = format_summary(&order, &note, self.utc_offset_hours);
        let record = OrderRecord::new(order, note);
        let psid = record.order.psid.as_str();

        tracing::info!(order_id = %record.order_id, psid, "Submitting order");

        self.sink.save(&record).await.inspect_err(|e| {
            tracing::error!(order_id = %record.order_id, "Failed to save order: {}", e)
        })?;

        self.replies.send_text(psid, &summary).await.inspect_err(|e| {
            tracing::error!(order_id = %record.order_id, "Failed to send order confirmation: {}", e)
        })?;

        self.notifier.notify(&record).await.inspect_err(|e| {
            tracing::error!(order_id = %record.order_id, "Failed to notify staff: {}", e)
        })?;

        if self.clear_note_after_submit {
            self.sessions.clear_note(psid).await;
        }

        Ok(record)
    }
}
