// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request handlers.
//!
//! POST /webhook acknowledges before processing: the platform retries on
//! slow responses, so the handler normalizes, rate-limits, spawns the
//! pipeline in the background, and returns immediately. Background
//! failures are logged, never surfaced to the transport.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use formflow_core::types::{ActionType, UserAction, DEFAULT_USER_NAME};

use crate::server::GatewayState;

/// Inbound platform webhook payload. Every field is optional; anything
/// missing degrades to an `Unknown` action and produces no response.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub sender: Option<WebhookSender>,
    #[serde(default)]
    pub message: Option<WebhookMessage>,
    #[serde(default)]
    pub user_name: Option<String>,
    /// Some payload revisions carry the identity at the top level.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookSender {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    #[serde(default)]
    pub text: Option<String>,
}

impl WebhookPayload {
    fn user_id(&self) -> Option<&str> {
        self.sender
            .as_ref()
            .and_then(|s| s.id.as_deref())
            .or(self.user_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Normalize to the shape the orchestrator understands.
    pub fn normalize(&self) -> UserAction {
        let Some(user_id) = self.user_id() else {
            return UserAction::new("", "", ActionType::Unknown, None);
        };
        let user_name = self
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_USER_NAME);
        let text = self
            .message
            .as_ref()
            .and_then(|m| m.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let action_type = match text {
            Some(t) if t.starts_with("/start") => ActionType::Start,
            Some(_) => ActionType::TextMessage,
            None => ActionType::Unknown,
        };
        UserAction::new(user_id, user_name, action_type, text.map(str::to_string))
    }
}

/// POST /webhook
///
/// Always acknowledges with `{"status":"received"}`, whatever happens
/// downstream.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    Json(payload): Json<WebhookPayload>,
) -> Json<Value> {
    let ack = Json(json!({ "status": "received" }));

    let action = payload.normalize();
    if action.action_type == ActionType::Unknown {
        debug!(event = ?payload.event_name, "webhook payload not actionable");
        return ack;
    }
    if !state.rate_limiter.check(&action.user_id) {
        debug!(user_id = %action.user_id, "webhook rate limited");
        return ack;
    }

    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        let outcome = pipeline.process(&action).await;
        if !outcome.success {
            warn!(user_id = %action.user_id, message = %outcome.message, "webhook processing failed");
        }
    });
    ack
}

/// Body of the form-tool submission webhook.
#[derive(Debug, Deserialize)]
pub struct FormSyncPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// POST /form-sync
///
/// A new form submission arrived; reconcile immediately instead of
/// waiting for the daily sweep.
pub async fn post_form_sync(
    State(state): State<GatewayState>,
    Json(payload): Json<FormSyncPayload>,
) -> Json<Value> {
    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    if email.is_none() {
        return Json(json!({ "status": "ignored", "message": "No email provided" }));
    }

    match state.reconciler.run_once().await {
        Ok(reconciled) => {
            info!(processed = reconciled.len(), "form-sync reconciliation ran");
            Json(json!({ "status": "success", "processed": reconciled.len() }))
        }
        Err(e) => {
            warn!(error = %e, "form-sync reconciliation failed");
            Json(json!({ "status": "error", "message": e.to_string() }))
        }
    }
}

/// Body of the status-change webhook.
#[derive(Debug, Deserialize)]
pub struct StatusChangePayload {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub old_status: Option<String>,
    #[serde(default)]
    pub new_status: Option<String>,
}

/// POST /status-change
///
/// Only the transition into `submitted` sends the thank-you; everything
/// else is acknowledged and ignored.
pub async fn post_status_change(
    State(state): State<GatewayState>,
    Json(payload): Json<StatusChangePayload>,
) -> Json<Value> {
    let old_status = payload.old_status.as_deref().unwrap_or("");
    let new_status = payload.new_status.as_deref().unwrap_or("");
    if new_status != "submitted" || old_status == "submitted" {
        return Json(json!({
            "status": "ignored",
            "message": format!("Status change ignored: {old_status} -> {new_status}"),
        }));
    }

    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_USER_NAME);
    let action = UserAction::new(payload.id.clone(), username, ActionType::Completed, None);
    let outcome = state.pipeline.process(&action).await;
    if outcome.success {
        Json(json!({
            "status": "success",
            "message": format!("Thank you message sent to {username}"),
            "user_id": payload.id,
        }))
    } else {
        Json(json!({ "status": "error", "message": outcome.message }))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /callback
///
/// OAuth redirect target for the platform console; echoes the handshake
/// parameters so the operator can finish token setup.
pub async fn get_callback(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    info!(?params, "oauth callback received");
    Json(json!({
        "status": "ok",
        "oa_id": params.get("oa_id"),
        "code": params.get("code"),
        "message": "OAuth callback received",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(raw: &str) -> WebhookPayload {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn normalizes_text_message() {
        let action = payload(
            r#"{"event_name":"user_send_text","sender":{"id":"u1"},"message":{"text":"hi"},"user_name":"Minh"}"#,
        )
        .normalize();
        assert_eq!(action.action_type, ActionType::TextMessage);
        assert_eq!(action.user_id, "u1");
        assert_eq!(action.user_name, "Minh");
        assert_eq!(action.data.as_deref(), Some("hi"));
    }

    #[test]
    fn slash_start_becomes_a_start_action() {
        let action = payload(r#"{"sender":{"id":"u1"},"message":{"text":"/start"}}"#).normalize();
        assert_eq!(action.action_type, ActionType::Start);
    }

    #[test]
    fn missing_sender_id_is_unknown() {
        let action = payload(r#"{"message":{"text":"hi"}}"#).normalize();
        assert_eq!(action.action_type, ActionType::Unknown);
    }

    #[test]
    fn top_level_user_id_is_accepted() {
        let action = payload(r#"{"user_id":"u9","message":{"text":"hi"}}"#).normalize();
        assert_eq!(action.user_id, "u9");
        assert_eq!(action.action_type, ActionType::TextMessage);
    }

    #[test]
    fn missing_user_name_falls_back_to_default() {
        let action = payload(r#"{"sender":{"id":"u1"},"message":{"text":"hi"}}"#).normalize();
        assert_eq!(action.user_name, DEFAULT_USER_NAME);
    }

    #[test]
    fn empty_text_is_unknown() {
        let action = payload(r#"{"sender":{"id":"u1"},"message":{"text":"  "}}"#).normalize();
        assert_eq!(action.action_type, ActionType::Unknown);
    }
}
