//! 网关集成测试：用假协作方驱动 axum 路由

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

use saiua::chat::{ChatPipeline, DEFAULT_PERSONA};
use saiua::core::{BotError, BotResult, ShutdownManager};
use saiua::gateway::{create_router, webhook, AppState};
use saiua::integrations::{OrderSink, ReplySender, StaffNotifier};
use saiua::llm::LlmClient;
use saiua::options::StaticOptionsProvider;
use saiua::order::{OrderRecord, OrderService};
use saiua::session::{MemorySessionStore, SessionStore};

#[derive(Default)]
struct Fakes {
    saved: Mutex<Vec<OrderRecord>>,
    replies: Mutex<Vec<(String, String)>>,
    notified: Mutex<Vec<OrderRecord>>,
    fail_save: bool,
    fail_llm: bool,
}

#[async_trait]
impl OrderSink for Fakes {
    async fn save(&self, record: &OrderRecord) -> BotResult<()> {
        if self.fail_save {
            return Err(BotError::Sheets("sheet unavailable".to_string()));
        }
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl ReplySender for Fakes {
    async fn send_text(&self, psid: &str, text: &str) -> BotResult<()> {
        self.replies
            .lock()
            .unwrap()
            .push((psid.to_string(), text.to_string()));
        Ok(())
    }
}

#[async_trait]
impl StaffNotifier for Fakes {
    async fn notify(&self, record: &OrderRecord) -> BotResult<()> {
        self.notified.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl LlmClient for Fakes {
    async fn complete(&self, _system_prompt: &str) -> BotResult<String> {
        if self.fail_llm {
            return Err(BotError::Llm("upstream 500".to_string()));
        }
        Ok("รับทราบครับ".to_string())
    }
}

const FALLBACK: &str = "ขอโทษครับ";

fn setup(fakes: Arc<Fakes>) -> (Arc<AppState>, Arc<MemorySessionStore>) {
    setup_with(fakes, TaskTracker::new(), None)
}

fn setup_with(
    fakes: Arc<Fakes>,
    tasks: TaskTracker,
    static_dir: Option<PathBuf>,
) -> (Arc<AppState>, Arc<MemorySessionStore>) {
    let sessions = Arc::new(MemorySessionStore::new());
    let options = Arc::new(StaticOptionsProvider::with_recipes([
        "หมูธรรมดา",
        "ไส้อั่วสูตรพิเศษสมุนไพรเต็มคำ",
    ]));
    let state = AppState {
        chat: ChatPipeline::new(
            options.clone(),
            sessions.clone(),
            fakes.clone(),
            DEFAULT_PERSONA,
        ),
        orders: OrderService::new(sessions.clone(), fakes.clone(), fakes.clone(), fakes.clone()),
        options,
        replies: fakes,
        verify_token: "XYZ".to_string(),
        fallback_reply: FALLBACK.to_string(),
        tasks,
        static_dir,
    };
    (Arc::new(state), sessions)
}

fn router(fakes: Arc<Fakes>) -> (Router, Arc<AppState>, Arc<MemorySessionStore>) {
    let (state, sessions) = setup(fakes);
    (create_router(state.clone()), state, sessions)
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn order_json() -> serde_json::Value {
    serde_json::json!({
        "psid": "u1",
        "recipe": "หมูธรรมดา",
        "amount": 2,
        "product_type": "พร้อมทาน",
        "pickup_place": "ร้าน A",
        "pickup_time": "2024-01-01T10:00:00Z",
        "address": "-"
    })
}

#[tokio::test]
async fn test_verify_handshake_accepts_matching_token() {
    let (app, _, _) = router(Arc::new(Fakes::default()));
    let resp = app
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=XYZ&hub.challenge=123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "123");
}

#[tokio::test]
async fn test_verify_handshake_rejects_wrong_token() {
    let (app, _, _) = router(Arc::new(Fakes::default()));
    let resp = app
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=WRONG&hub.challenge=123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_string(resp).await, "");
}

#[tokio::test]
async fn test_webhook_rejects_non_page_object() {
    let (app, _, _) = router(Arc::new(Fakes::default()));
    let resp = app
        .oneshot(json_request(
            "POST",
            "/webhook",
            serde_json::json!({ "object": "instagram", "entry": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_webhook_acknowledges_page_events() {
    let (app, _, _) = router(Arc::new(Fakes::default()));
    let resp = app
        .oneshot(json_request(
            "POST",
            "/webhook",
            serde_json::json!({ "object": "page", "entry": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "EVENT_RECEIVED");
}

#[tokio::test]
async fn test_dispatch_replies_and_captures_remarks() {
    let fakes = Arc::new(Fakes::default());
    let (state, sessions) = setup(fakes.clone());

    let payload: webhook::WebhookPayload = serde_json::from_value(serde_json::json!({
        "object": "page",
        "entry": [{
            "messaging": [
                { "sender": { "id": "u1" }, "message": { "text": "อยากได้เผ็ดน้อย" } },
                { "sender": { "id": "u2" }, "message": { "text": "ขอหมูธรรมดาครับ" } }
            ]
        }]
    }))
    .unwrap();

    webhook::dispatch(state, webhook::extract_texts(payload))
        .await
        .unwrap();

    assert_eq!(sessions.get_note("u1").await, "อยากได้เผ็ดน้อย");
    assert_eq!(sessions.get_note("u2").await, "");

    let mut replies = fakes.replies.lock().unwrap().clone();
    replies.sort();
    assert_eq!(
        replies,
        vec![
            ("u1".to_string(), "รับทราบครับ".to_string()),
            ("u2".to_string(), "รับทราบครับ".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_dispatch_sends_fallback_on_pipeline_failure() {
    let fakes = Arc::new(Fakes {
        fail_llm: true,
        ..Default::default()
    });
    let (state, _) = setup(fakes.clone());

    let incoming = saiua::chat::IncomingText {
        psid: "u1".to_string(),
        text: "สวัสดี".to_string(),
    };
    webhook::handle_incoming(&state, incoming).await;

    let replies = fakes.replies.lock().unwrap();
    assert_eq!(replies.as_slice(), [("u1".to_string(), FALLBACK.to_string())]);
}

#[tokio::test]
async fn test_dispatched_tasks_are_drained_on_shutdown() {
    let fakes = Arc::new(Fakes::default());
    let shutdown = ShutdownManager::new();
    let (state, sessions) = setup_with(fakes.clone(), shutdown.tasks(), None);

    let messages = vec![saiua::chat::IncomingText {
        psid: "u1".to_string(),
        text: "ไม่ใส่ผัก".to_string(),
    }];
    // 不持有 JoinHandle，与 receive 的用法一致
    drop(webhook::dispatch(state, messages));

    assert!(shutdown.drain(Duration::from_secs(5)).await);
    assert_eq!(sessions.get_note("u1").await, "ไม่ใส่ผัก");
    assert_eq!(fakes.replies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_static_dir_serves_order_form() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("order.html"), "<h1>สั่งไส้อั่ว</h1>").unwrap();

    let (state, _) = setup_with(
        Arc::new(Fakes::default()),
        TaskTracker::new(),
        Some(dir.path().to_path_buf()),
    );
    let app = create_router(state);

    let resp = app
        .clone()
        .oneshot(Request::get("/order.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "<h1>สั่งไส้อั่ว</h1>");

    let resp = app
        .clone()
        .oneshot(Request::get("/missing.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 显式路由优先于静态回退
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "OK");
}

#[tokio::test]
async fn test_recipe_quick_reply_truncates_titles() {
    let (app, _, _) = router(Arc::new(Fakes::default()));
    let resp = app
        .oneshot(Request::get("/api/quick-reply").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    let replies = json["quick_replies"].as_array().unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["title"], "หมูธรรมดา");
    assert_eq!(replies[0]["content_type"], "text");
    assert_eq!(replies[0]["payload"], "RECIPE_หมูธรรมดา");
    assert_eq!(replies[1]["title"].as_str().unwrap().chars().count(), 20);
    assert_eq!(replies[1]["payload"], "RECIPE_ไส้อั่วสูตรพิเศษสมุนไพรเต็มคำ");
}

#[tokio::test]
async fn test_product_type_quick_reply() {
    let (app, _, _) = router(Arc::new(Fakes::default()));
    let resp = app
        .oneshot(
            Request::get("/api/quick-reply/product-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(json["quick_replies"][0]["title"], "พร้อมทาน");
    assert_eq!(json["quick_replies"][0]["payload"], "PRODUCT_READY");
    assert_eq!(json["quick_replies"][1]["title"], "ซีลสุญญากาศ");
    assert_eq!(json["quick_replies"][1]["payload"], "PRODUCT_SEALED");
}

#[tokio::test]
async fn test_order_submission_merges_note() {
    let fakes = Arc::new(Fakes::default());
    let (app, _, sessions) = router(fakes.clone());
    sessions.append_note("u1", "อยากได้เผ็ดน้อย").await;

    let resp = app
        .oneshot(json_request("POST", "/api/order", order_json()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "ok" }));

    let saved = fakes.saved.lock().unwrap();
    let notified = fakes.notified.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(notified.len(), 1);
    assert_eq!(saved[0].note, "อยากได้เผ็ดน้อย");
    assert_eq!(notified[0].note, "อยากได้เผ็ดน้อย");
    assert_eq!(saved[0].order.recipe, "หมูธรรมดา");

    let replies = fakes.replies.lock().unwrap();
    assert_eq!(replies.len(), 1);
    let msg = &replies[0].1;
    for field in ["หมูธรรมดา", "2 โล", "พร้อมทาน", "ร้าน A", "01/01/2024 17:00", "-"] {
        assert!(msg.contains(field), "missing {}", field);
    }
    assert!(msg.contains("📝 หมายเหตุ: อยากได้เผ็ดน้อย"));
}

#[tokio::test]
async fn test_order_persistence_failure_short_circuits() {
    let fakes = Arc::new(Fakes {
        fail_save: true,
        ..Default::default()
    });
    let (app, _, _) = router(fakes.clone());

    let resp = app
        .oneshot(json_request("POST", "/api/order", order_json()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Sheets API error: sheet unavailable");
    assert!(fakes.replies.lock().unwrap().is_empty());
    assert!(fakes.notified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_order_is_bad_request() {
    let (app, _, _) = router(Arc::new(Fakes::default()));
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/order",
            serde_json::json!({ "psid": "u1" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(json["status"], "error");
}
