// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zalo Official Account messaging gateway.
//!
//! Sends through the customer-support message endpoint
//! (`POST {base}/message/cs`). Zalo has no in-place message editing, so
//! `Edit` responses are delivered as fresh messages, and it has no inline
//! buttons on plain text, so URL buttons are appended as text lines.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use formflow_core::error::FormflowError;
use formflow_core::traits::MessagingGateway;
use formflow_core::types::{BotResponse, ButtonKind, Delivery};

const DEFAULT_BASE_URL: &str = "https://openapi.zalo.me/v3.0";
const SEND_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct Recipient<'a> {
    user_id: &'a str,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    recipient: Recipient<'a>,
    message: TextMessage<'a>,
}

pub struct ZaloGateway {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl ZaloGateway {
    pub fn new(access_token: impl Into<String>) -> Result<Self, FormflowError> {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, FormflowError> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| FormflowError::Gateway {
                message: format!("failed to build zalo client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// Text plus any URL buttons rendered as trailing lines.
    fn flatten(response: &BotResponse) -> String {
        let mut text = response.text.clone();
        for button in &response.buttons {
            if button.kind == ButtonKind::Url {
                text.push_str(&format!("\n{}: {}", button.text, button.value));
            }
        }
        text
    }
}

#[async_trait]
impl MessagingGateway for ZaloGateway {
    async fn send(&self, response: &BotResponse, user_id: &str) -> Result<(), FormflowError> {
        if response.delivery == Delivery::Ignore || response.text.is_empty() || user_id.is_empty() {
            return Ok(());
        }

        let text = Self::flatten(response);
        let body = SendRequest {
            recipient: Recipient { user_id },
            message: TextMessage { text: &text },
        };

        let url = format!("{}/message/cs", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("access_token", &self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| FormflowError::Gateway {
                message: format!("zalo send failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FormflowError::gateway(format!(
                "zalo send returned {status}"
            )));
        }

        // Zalo reports API-level errors in the body with HTTP 200.
        let payload: Value = resp.json().await.map_err(|e| FormflowError::Gateway {
            message: format!("zalo response unreadable: {e}"),
            source: Some(Box::new(e)),
        })?;
        let code = payload.get("error").and_then(Value::as_i64).unwrap_or(0);
        if code != 0 {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            return Err(FormflowError::gateway(format!(
                "zalo error {code}: {message}"
            )));
        }

        debug!(user_id, "zalo message delivered");
        Ok(())
    }
}
