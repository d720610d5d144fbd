//! 下单：订单结构、确认消息格式化与提交流程

pub mod model;
pub mod service;
pub mod summary;

pub use model::{Amount, Order, OrderRecord};
pub use service::OrderService;
pub use summary::{format_pickup_time, format_summary};
