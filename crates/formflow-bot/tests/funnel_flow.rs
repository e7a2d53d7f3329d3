// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end funnel journey through the orchestrator and pipeline.

use std::sync::Arc;

use formflow_bot::{MessagePipeline, Orchestrator, TemplateSet};
use formflow_core::stage::{classify, Stage};
use formflow_core::types::{ActionType, FormStatus, UserAction};
use formflow_test_utils::{MockExtractor, MockGateway, MockRecordStore};

fn build(
    store: Arc<MockRecordStore>,
    gateway: Arc<MockGateway>,
    extractor: Arc<MockExtractor>,
) -> MessagePipeline {
    let orchestrator = Arc::new(Orchestrator::new(
        store,
        extractor,
        TemplateSet::builtin().unwrap(),
        Some("https://forms.example/f".into()),
    ));
    MessagePipeline::new(orchestrator, gateway)
}

fn text(user_id: &str, body: &str) -> UserAction {
    UserAction::new(user_id, "Minh", ActionType::TextMessage, Some(body.into()))
}

#[tokio::test]
async fn full_journey_from_start_to_submission() {
    let store = Arc::new(MockRecordStore::new());
    let gateway = Arc::new(MockGateway::new());
    let extractor = Arc::new(MockExtractor::new());
    let pipeline = build(store.clone(), gateway.clone(), extractor.clone());

    // /start: record created, welcome sent, user now collecting email.
    let outcome = pipeline
        .process(&UserAction::new("u1", "Minh", ActionType::Start, None))
        .await;
    assert!(outcome.success);
    let record = store.record("u1").await.unwrap();
    assert_eq!(record.form_status, FormStatus::Pending);
    assert_eq!(classify(Some(&record)), Stage::ProvideField);

    // A message without an email re-prompts, state unchanged.
    pipeline.process(&text("u1", "xin chào")).await;
    assert_eq!(
        classify(store.record("u1").await.as_ref()),
        Stage::ProvideField
    );

    // The email lands: record completes, form/CTA message goes out.
    extractor.set_result(Some("minh@example.com")).await;
    let outcome = pipeline.process(&text("u1", "email: minh@example.com")).await;
    assert!(outcome.success);
    let record = store.record("u1").await.unwrap();
    assert_eq!(record.email, "minh@example.com");
    assert!(record.last_follow_up_sent.is_some());
    assert_eq!(classify(Some(&record)), Stage::FollowUp);

    // Self-reported completion is rejected while the store says pending.
    let callback = UserAction::new(
        "u1",
        "Minh",
        ActionType::Callback,
        Some("form_filled".into()),
    );
    pipeline.process(&callback).await;
    assert_eq!(
        store.record("u1").await.unwrap().form_status,
        FormStatus::Pending
    );

    // The store observes the real submission; now the callback thanks.
    store
        .insert({
            let mut r = store.record("u1").await.unwrap();
            r.form_status = FormStatus::Submitted;
            r
        })
        .await;
    let outcome = pipeline.process(&callback).await;
    assert!(outcome.success);
    assert!(outcome.response_text.contains("Cảm ơn"));

    // Submitted users chatting get no bot reply at all.
    let sent_before = gateway.sent_count().await;
    let outcome = pipeline.process(&text("u1", "cảm ơn shop")).await;
    assert!(outcome.success);
    assert!(outcome.response_text.is_empty());
    assert_eq!(gateway.sent_count().await, sent_before);
}

#[tokio::test]
async fn two_rapid_starts_leave_consistent_state() {
    let store = Arc::new(MockRecordStore::new());
    let gateway = Arc::new(MockGateway::new());
    let pipeline = build(store.clone(), gateway, Arc::new(MockExtractor::new()));

    let start = UserAction::new("u1", "Minh", ActionType::Start, None);
    pipeline.process(&start).await;
    pipeline.process(&start).await;

    // Duplicate events may cause a duplicate send, never corrupted state.
    assert_eq!(store.len().await, 1);
    assert_eq!(
        classify(store.record("u1").await.as_ref()),
        Stage::ProvideField
    );
}
