//! 确认消息格式化

use chrono::{DateTime, FixedOffset};

use super::Order;

/// 取货时间：能按 RFC 3339 解析时换算到展示时区，否则原样返回（时区越界时同样原样返回）
pub fn format_pickup_time(raw: &str, utc_offset_hours: i32) -> String {
    let Some(offset) = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
    else {
        return raw.to_string();
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// 发给客户的订单确认；备注为空时不输出备注行
pub fn format_summary(order: &Order, note: &str, utc_offset_hours: i32) -> String {
    let mut msg = format!(
        "บ่าวน้อยได้รับออเดอร์แล้วครับ ขอบคุณมาก ๆ เลยครับพี่ 🙏\n\n\
         🥓 สูตร: {}\n\
         📦 จำนวน: {} โล\n\
         🧊 ประเภทสินค้า: {}\n\
         📍 รับที่: {}\n\
         🕒 วันที่-เวลา: {}\n\
         🚚 จัดส่งไปที่: {}",
        order.recipe,
        order.amount,
        order.product_type,
        order.pickup_place,
        format_pickup_time(&order.pickup_time, utc_offset_hours),
        order.address,
    );
    if !note.is_empty() {
        msg.push_str("\n📝 หมายเหตุ: ");
        msg.push_str(note);
    }
    msg
}
