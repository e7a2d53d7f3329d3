// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging gateway capturing sent responses.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use formflow_core::error::FormflowError;
use formflow_core::traits::MessagingGateway;
use formflow_core::types::{BotResponse, Delivery};

/// A mock gateway.
///
/// Responses passed to `send()` are captured (user id + response) and
/// retrievable for assertions. `Ignore` deliveries and empty texts are
/// dropped, matching real gateway behavior.
#[derive(Default)]
pub struct MockGateway {
    sent: Arc<Mutex<Vec<(String, BotResponse)>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured sends, in order.
    pub async fn sent(&self) -> Vec<(String, BotResponse)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }

    /// Make the next send fail with a transport error.
    pub async fn fail_next(&self) {
        *self.fail_next.lock().await = true;
    }
}

#[async_trait]
impl MessagingGateway for MockGateway {
    async fn send(&self, response: &BotResponse, user_id: &str) -> Result<(), FormflowError> {
        {
            let mut flag = self.fail_next.lock().await;
            if *flag {
                *flag = false;
                return Err(FormflowError::gateway("mock transport failure"));
            }
        }
        if response.delivery == Delivery::Ignore || response.text.is_empty() {
            return Ok(());
        }
        self.sent
            .lock()
            .await
            .push((user_id.to_string(), response.clone()));
        Ok(())
    }
}
