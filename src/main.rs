//! Saiua Messenger 服务
//!
//! 配置见 config/default.toml，常用环境变量:
//! - OPENAI_API_KEY / DEEPSEEK_API_KEY: LLM API Key（均未设置时使用 Mock）
//! - PAGE_ACCESS_TOKEN: Messenger Page 访问令牌
//! - VERIFY_TOKEN: Webhook 验证令牌
//! - SPREADSHEET_ID / GOOGLE_SHEETS_ACCESS_TOKEN: 订单表与选项表
//! - LINE_CHANNEL_ACCESS_TOKEN / LINE_TARGET_ID: 员工通知
//! - PORT: 监听端口（默认 3000）
//!
//! 启动: cargo run -- [config.toml]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use saiua::config::load_config;
use saiua::core::{ShutdownManager, ShutdownReason};
use saiua::gateway::{build_state, create_router};

/// 关闭时等待后台聊天任务的上限（覆盖一次 LLM 请求 + 回复发送）
const TASK_DRAIN_SECS: u64 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;

    saiua::observability::init(&cfg.log);

    if cfg.messenger.verify_token.is_empty() {
        tracing::warn!("VERIFY_TOKEN is not set, webhook verification will always fail");
    }

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    let state = Arc::new(build_state(&cfg, shutdown.tasks()).context("Failed to build app state")?);
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.server.bind, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Saiua server listening on http://{}", addr);
    tracing::info!("Webhook URL: http://YOUR_HOST:{}/webhook", cfg.server.port);

    let waiter = Arc::clone(&shutdown);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async move { waiter.wait_for_shutdown().await })
        .await
    {
        shutdown.shutdown(ShutdownReason::FatalError(e.to_string()));
        return Err(e).context("Server error");
    }

    // 等待仍在生成回复的后台任务
    shutdown.drain(Duration::from_secs(TASK_DRAIN_SECS)).await;

    tracing::info!("Server stopped");
    Ok(())
}
