//! 下单页面使用的 JSON API

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::AppState;
use crate::integrations::messenger::{
    product_type_quick_replies, recipe_quick_replies, QuickReplyMessage,
};
use crate::order::Order;

/// 接口错误：`{ "status": "error", "message": ... }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn internal(message: impl ToString) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }

    pub fn bad_request(message: impl ToString) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "status": "error", "message": self.message })),
        )
            .into_response()
    }
}

/// GET /api/quick-reply：由当前配方列表生成
pub async fn recipe_quick_reply(
    State(state): State<Arc<AppState>>,
) -> Result<Json<QuickReplyMessage>, ApiError> {
    let options = state.options.load().await.map_err(|e| {
        tracing::error!("Failed to load quick reply options: {}", e);
        ApiError::internal(e)
    })?;
    Ok(Json(recipe_quick_replies(options.recipes())))
}

/// GET /api/quick-reply/product-type
pub async fn product_type_quick_reply() -> Json<QuickReplyMessage> {
    Json(product_type_quick_replies())
}

/// POST /api/order
pub async fn submit_order(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Order>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(order) = body.map_err(|e| {
        tracing::warn!("Rejected order payload: {}", e.body_text());
        ApiError::bad_request(e.body_text())
    })?;

    state.orders.submit(order).await.map_err(ApiError::internal)?;
    Ok(Json(json!({ "status": "ok" })))
}
