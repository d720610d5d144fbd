//! 网关共享状态：由 `AppConfig` 一次性装配全部组件

use std::path::PathBuf;
use std::sync::Arc;

use crate::chat::{load_persona, ChatPipeline};
use crate::config::AppConfig;
use async_trait::async_trait;
use tokio_util::task::TaskTracker;

use crate::core::{BotError, BotResult};
use crate::integrations::{
    build_http_client, LineNotifier, MessengerClient, OrderSink, ReplySender, SheetsClient,
    SheetsOptionsProvider, SheetsOrderSink,
};
use crate::llm::create_llm_from_config;
use crate::options::{OptionsProvider, StaticOptionsProvider};
use crate::order::{OrderRecord, OrderService};
use crate::session::{MemorySessionStore, SessionStore};

/// 网关状态
pub struct AppState {
    pub chat: ChatPipeline,
    pub orders: OrderService,
    pub options: Arc<dyn OptionsProvider>,
    pub replies: Arc<dyn ReplySender>,
    /// Webhook 校验令牌
    pub verify_token: String,
    /// 聊天管线失败时的致歉文案
    pub fallback_reply: String,
    /// Webhook 派生的后台任务，关闭时等待
    pub tasks: TaskTracker,
    /// 下单页面静态目录
    pub static_dir: Option<PathBuf>,
}

/// 按配置装配真实的外部协作方
///
/// 未配置 Google Sheets 时选项改读配置文件；订单落表仍需要表格，此时 `/api/order` 会返回错误。
pub fn build_state(cfg: &AppConfig, tasks: TaskTracker) -> BotResult<AppState> {
    let http = build_http_client(cfg.http.timeout_secs)?;
    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let replies: Arc<dyn ReplySender> = Arc::new(MessengerClient::new(http.clone(), &cfg.messenger));
    let notifier = Arc::new(LineNotifier::new(http.clone(), &cfg.line));
    let llm = create_llm_from_config(&cfg.llm);

    let sheets = SheetsClient::from_config(http, &cfg.sheets);
    let options: Arc<dyn OptionsProvider> = match &sheets {
        Some(client) => Arc::new(SheetsOptionsProvider::new(
            client.clone(),
            cfg.sheets.options_range.clone(),
        )),
        None => {
            tracing::warn!("Google Sheets not configured, using static options from config");
            Arc::new(StaticOptionsProvider::from_config(&cfg.options))
        }
    };
    let sink: Arc<dyn OrderSink> = match sheets {
        Some(client) => Arc::new(SheetsOrderSink::new(client, cfg.sheets.order_range.clone())),
        None => Arc::new(UnconfiguredSink),
    };

    let persona = load_persona(cfg.chat.persona_path.as_deref());
    let chat = ChatPipeline::new(options.clone(), sessions.clone(), llm, persona);
    let orders = OrderService::new(sessions, sink, replies.clone(), notifier)
        .with_clear_note_after_submit(cfg.order.clear_note_after_submit)
        .with_utc_offset_hours(cfg.order.display_utc_offset_hours);

    Ok(AppState {
        chat,
        orders,
        options,
        replies,
        verify_token: cfg.messenger.verify_token.clone(),
        fallback_reply: cfg.chat.fallback_reply.clone(),
        tasks,
        static_dir: cfg.server.static_dir.clone(),
    })
}

/// 未配置表格时的订单落表：总是失败，避免订单在无记录的情况下继续通知
struct UnconfiguredSink;

#[async_trait]
impl OrderSink for UnconfiguredSink {
    async fn save(&self, _record: &OrderRecord) -> BotResult<()> {
        Err(BotError::Config(
            "sheets.spreadsheet_id / sheets.access_token not set".to_string(),
        ))
    }
}
