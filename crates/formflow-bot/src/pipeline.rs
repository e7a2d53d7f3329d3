// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process boundary around the orchestrator.
//!
//! Every public entry point (webhook background task, cron sweeps) goes
//! through [`MessagePipeline::process`], which converts internal failures
//! into a structured [`ProcessOutcome`] instead of letting errors escape.

use std::sync::Arc;

use tracing::{error, warn};

use formflow_core::traits::MessagingGateway;
use formflow_core::types::{Delivery, UserAction};

use crate::orchestrator::Orchestrator;

/// Structured result of processing one inbound action.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub success: bool,
    pub message: String,
    /// Text of the rendered response, empty when nothing was sent.
    pub response_text: String,
}

impl ProcessOutcome {
    fn ok(response_text: String) -> Self {
        Self {
            success: true,
            message: "processed".to_string(),
            response_text,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
            response_text: String::new(),
        }
    }
}

/// Orchestrator plus delivery, with the catch-all error boundary.
pub struct MessagePipeline {
    orchestrator: Arc<Orchestrator>,
    gateway: Arc<dyn MessagingGateway>,
}

impl MessagePipeline {
    pub fn new(orchestrator: Arc<Orchestrator>, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self {
            orchestrator,
            gateway,
        }
    }

    /// Process one action end to end. Never returns an error: business
    /// failures become `success=false`, transport failures are logged
    /// and not retried.
    pub async fn process(&self, action: &UserAction) -> ProcessOutcome {
        let response = match self.orchestrator.handle_action(action).await {
            Ok(response) => response,
            Err(e) => {
                error!(user_id = %action.user_id, error = %e, "action processing failed");
                return ProcessOutcome::failed(format!("error processing action: {e}"));
            }
        };

        if response.delivery != Delivery::Ignore && !response.text.is_empty() {
            if let Err(e) = self.gateway.send(&response, &action.user_id).await {
                warn!(user_id = %action.user_id, error = %e, "send failed");
            }
        }
        ProcessOutcome::ok(response.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_core::types::{ActionType, FormStatus, UserRecord};
    use formflow_test_utils::{MockExtractor, MockGateway, MockRecordStore};

    use crate::templates::TemplateSet;

    fn pipeline(
        store: Arc<MockRecordStore>,
        gateway: Arc<MockGateway>,
    ) -> MessagePipeline {
        let orchestrator = Arc::new(Orchestrator::new(
            store,
            Arc::new(MockExtractor::new()),
            TemplateSet::builtin().unwrap(),
            None,
        ));
        MessagePipeline::new(orchestrator, gateway)
    }

    #[tokio::test]
    async fn successful_action_is_sent_and_reported() {
        let store = Arc::new(MockRecordStore::new());
        let gateway = Arc::new(MockGateway::new());
        let pipeline = pipeline(store, gateway.clone());

        let action = UserAction::new("u1", "Minh", ActionType::Start, None);
        let outcome = pipeline.process(&action).await;

        assert!(outcome.success);
        assert!(!outcome.response_text.is_empty());
        assert_eq!(gateway.sent_count().await, 1);
    }

    #[tokio::test]
    async fn ignored_action_sends_nothing() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.form_status = FormStatus::Submitted;
        store.insert(record).await;
        let gateway = Arc::new(MockGateway::new());
        let pipeline = pipeline(store, gateway.clone());

        let action = UserAction::new("u1", "Minh", ActionType::TextMessage, Some("hi".into()));
        let outcome = pipeline.process(&action).await;

        assert!(outcome.success);
        assert!(outcome.response_text.is_empty());
        assert_eq!(gateway.sent_count().await, 0);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_failed_outcome() {
        let store = Arc::new(MockRecordStore::new());
        store.fail_next().await;
        let gateway = Arc::new(MockGateway::new());
        let pipeline = pipeline(store, gateway.clone());

        let action = UserAction::new("u1", "Minh", ActionType::Start, None);
        let outcome = pipeline.process(&action).await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("error processing action"));
        assert_eq!(gateway.sent_count().await, 0);
    }

    #[tokio::test]
    async fn transport_failure_is_swallowed() {
        let store = Arc::new(MockRecordStore::new());
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_next().await;
        let pipeline = pipeline(store, gateway.clone());

        let action = UserAction::new("u1", "Minh", ActionType::Start, None);
        let outcome = pipeline.process(&action).await;

        // Gateway errors are logged, never failed back to the caller.
        assert!(outcome.success);
    }
}
