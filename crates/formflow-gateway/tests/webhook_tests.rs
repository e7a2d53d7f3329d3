// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests over the webhook endpoints.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use formflow_bot::{MessagePipeline, Orchestrator, RateLimiter, TemplateSet};
use formflow_core::types::{FormStatus, UserRecord};
use formflow_cron::ReconcileSweeper;
use formflow_gateway::{build_router, GatewayState};
use formflow_test_utils::{MockExtractor, MockGateway, MockRecordStore};

struct Harness {
    router: axum::Router,
    store: Arc<MockRecordStore>,
    gateway: Arc<MockGateway>,
}

fn harness() -> Harness {
    let store = Arc::new(MockRecordStore::new());
    let gateway = Arc::new(MockGateway::new());
    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        Arc::new(MockExtractor::new()),
        TemplateSet::builtin().unwrap(),
        Some("https://forms.example/f".into()),
    ));
    let pipeline = Arc::new(MessagePipeline::new(orchestrator, gateway.clone()));
    let reconciler = Arc::new(ReconcileSweeper::new(store.clone(), gateway.clone()));
    let state = GatewayState {
        pipeline,
        rate_limiter: Arc::new(RateLimiter::new(
            Duration::from_secs(5),
            Duration::from_secs(600),
            Duration::from_secs(300),
        )),
        reconciler,
        start_time: Instant::now(),
    };
    Harness {
        router: build_router(state),
        store,
        gateway,
    }
}

async fn post_json(router: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn webhook_acks_immediately() {
    let h = harness();
    let (status, body) = post_json(
        &h.router,
        "/webhook",
        json!({
            "event_name": "user_send_text",
            "sender": { "id": "u1" },
            "message": { "text": "/start" },
            "user_name": "Minh"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "received");

    // Processing runs in the background after the ack.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(h.store.record("u1").await.is_some());
    assert_eq!(h.gateway.sent_count().await, 1);
}

#[tokio::test]
async fn malformed_webhook_is_acked_and_dropped() {
    let h = harness();
    let (status, body) = post_json(
        &h.router,
        "/webhook",
        json!({ "event_name": "user_send_text", "message": { "text": "hi" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "received");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.store.is_empty().await);
    assert_eq!(h.gateway.sent_count().await, 0);
}

#[tokio::test]
async fn rapid_duplicate_webhooks_are_rate_limited() {
    let h = harness();
    let payload = json!({
        "sender": { "id": "u1" },
        "message": { "text": "/start" }
    });
    post_json(&h.router, "/webhook", payload.clone()).await;
    let (status, body) = post_json(&h.router, "/webhook", payload).await;

    // The second event is still acknowledged, just not processed.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "received");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.gateway.sent_count().await, 1);
}

#[tokio::test]
async fn form_sync_without_email_is_ignored() {
    let h = harness();
    let (_, body) = post_json(&h.router, "/form-sync", json!({ "form_id": "f1" })).await;
    assert_eq!(body["status"], "ignored");
}

#[tokio::test]
async fn form_sync_triggers_reconciliation() {
    let h = harness();
    h.store.insert(UserRecord::new_pending("u1", "minh_ng")).await;
    let mut response_row = UserRecord::new_pending("resp", "minh_ng");
    response_row.form_status = FormStatus::Submitted;
    h.store.set_responses(vec![response_row]).await;

    let (_, body) = post_json(
        &h.router,
        "/form-sync",
        json!({ "email": "minh@example.com" }),
    )
    .await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["processed"], 1);
    assert_eq!(
        h.store.record("u1").await.unwrap().form_status,
        FormStatus::Submitted
    );
}

#[tokio::test]
async fn status_change_to_submitted_sends_thank_you() {
    let h = harness();
    let (_, body) = post_json(
        &h.router,
        "/status-change",
        json!({
            "id": "u1",
            "username": "minh_ng",
            "old_status": "pending",
            "new_status": "submitted"
        }),
    )
    .await;
    assert_eq!(body["status"], "success");
    let sent = h.gateway.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "u1");
    assert!(sent[0].1.text.contains("Cảm ơn"));
}

#[tokio::test]
async fn other_status_changes_are_ignored() {
    let h = harness();
    let (_, body) = post_json(
        &h.router,
        "/status-change",
        json!({ "id": "u1", "old_status": "submitted", "new_status": "submitted" }),
    )
    .await;
    assert_eq!(body["status"], "ignored");
    assert_eq!(h.gateway.sent_count().await, 0);
}

#[tokio::test]
async fn health_reports_ok() {
    let h = harness();
    let response = h
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn oauth_callback_echoes_params() {
    let h = harness();
    let response = h
        .router
        .clone()
        .oneshot(
            Request::get("/callback?oa_id=123&code=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["oa_id"], "123");
    assert_eq!(body["code"], "abc");
}
