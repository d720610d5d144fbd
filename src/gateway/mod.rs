//! HTTP 网关：Messenger Webhook 与下单 API
//!
//! 路由：
//! - `GET  /webhook`                       Webhook 校验握手
//! - `POST /webhook`                       接收 Messenger 事件
//! - `GET  /api/quick-reply`               配方 Quick Reply
//! - `GET  /api/quick-reply/product-type`  商品类型 Quick Reply
//! - `POST /api/order`                     提交订单
//! - `GET  /health`
//! - 其余路径回退到静态目录（下单页面），见 `server.static_dir`

pub mod api;
pub mod state;
pub mod webhook;

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use tower_http::services::ServeDir;

pub use state::{build_state, AppState};

/// 创建路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/webhook", get(webhook::verify).post(webhook::receive))
        .route("/api/quick-reply", get(api::recipe_quick_reply))
        .route("/api/quick-reply/product-type", get(api::product_type_quick_reply))
        .route("/api/order", post(api::submit_order))
        .route("/health", get(|| async { "OK" }));

    if let Some(dir) = &state.static_dir {
        tracing::info!("Serving static files from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.with_state(state)
}
