// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation sweep.
//!
//! The form tool writes submissions to its own dataset; this sweep aligns
//! the user records with it. Matching is by `username` (the form has no
//! access to platform identifiers). Every match not yet marked submitted
//! is marked and thanked.

use std::sync::Arc;

use tracing::{info, warn};

use formflow_bot::messages;
use formflow_core::error::FormflowError;
use formflow_core::traits::{MessagingGateway, RecordStore};
use formflow_core::types::{BotResponse, FormStatus};

pub struct ReconcileSweeper {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn MessagingGateway>,
}

impl ReconcileSweeper {
    pub fn new(store: Arc<dyn RecordStore>, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self { store, gateway }
    }

    /// One reconciliation pass. Returns the usernames whose records were
    /// newly marked submitted. Per-user failures are logged and the pass
    /// continues.
    pub async fn run_once(&self) -> Result<Vec<String>, FormflowError> {
        let responses = self.store.list_responses().await?;
        if responses.is_empty() {
            return Ok(Vec::new());
        }
        let users = self.store.list_all().await?;

        let mut reconciled = Vec::new();
        for response in &responses {
            let submitted_name = response.username.trim();
            if submitted_name.is_empty() {
                continue;
            }
            let Some(user) = users.iter().find(|u| u.username == submitted_name) else {
                continue;
            };
            if user.form_status == FormStatus::Submitted {
                continue;
            }

            if let Err(e) = self.store.mark_form_submitted(&user.id).await {
                warn!(user_id = %user.id, error = %e, "reconcile mark failed");
                continue;
            }
            let thanks = BotResponse::message(messages::THANK_YOU);
            if let Err(e) = self.gateway.send(&thanks, &user.id).await {
                warn!(user_id = %user.id, error = %e, "reconcile thank-you failed");
            }
            reconciled.push(user.username.clone());
        }

        if !reconciled.is_empty() {
            info!(count = reconciled.len(), "reconciled form submissions");
        }
        Ok(reconciled)
    }
}
