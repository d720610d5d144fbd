//! Saiua - บ่าวน้อยไส้อั่ว Messenger 下单机器人
//!
//! 模块划分：
//! - **chat**: 备注分类、提示词组装、聊天管线
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、优雅关闭
//! - **gateway**: axum 路由（Messenger Webhook、Quick Reply、下单 API）
//! - **integrations**: Messenger / Google Sheets / LINE 客户端
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **observability**: 日志
//! - **options**: 选项源（配方列表等）
//! - **order**: 订单结构、确认消息、提交流程
//! - **session**: 按用户的会话与备注存储

pub mod chat;
pub mod config;
pub mod core;
pub mod gateway;
pub mod integrations;
pub mod llm;
pub mod observability;
pub mod options;
pub mod order;
pub mod session;
