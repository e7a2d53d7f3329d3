// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-stage funnel orchestration.
//!
//! The orchestrator owns the business rules: which stage a user is in,
//! what message that stage gets, which record fields advance, and when a
//! text message deserves no reply at all. It talks to the outside world
//! only through the [`RecordStore`] and [`EmailExtractor`] traits.

use std::sync::Arc;

use tracing::{debug, warn};

use formflow_core::error::FormflowError;
use formflow_core::stage::{classify, Stage};
use formflow_core::traits::{EmailExtractor, RecordStore};
use formflow_core::types::{
    ActionType, BotResponse, Delivery, FormStatus, UserAction, UserPatch, UserRecord,
    DEFAULT_USER_NAME,
};

use crate::messages;
use crate::templates::TemplateSet;

pub struct Orchestrator {
    store: Arc<dyn RecordStore>,
    extractor: Arc<dyn EmailExtractor>,
    templates: TemplateSet,
    form_url: Option<String>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        extractor: Arc<dyn EmailExtractor>,
        templates: TemplateSet,
        form_url: Option<String>,
    ) -> Self {
        Self {
            store,
            extractor,
            templates,
            form_url,
        }
    }

    fn form_url(&self) -> Option<&str> {
        self.form_url.as_deref()
    }

    fn display_name(action: &UserAction) -> &str {
        let name = action.user_name.trim();
        if name.is_empty() {
            DEFAULT_USER_NAME
        } else {
            name
        }
    }

    /// Route one normalized action to its handler.
    pub async fn handle_action(&self, action: &UserAction) -> Result<BotResponse, FormflowError> {
        match action.action_type {
            ActionType::Start => self.handle_stage(action).await,
            ActionType::TextMessage => self.handle_text_message(action).await,
            ActionType::Callback => self.handle_callback(action).await,
            ActionType::Completed => Ok(self.handle_completed()),
            ActionType::FollowUp => self.handle_follow_up(action).await,
            ActionType::Unknown => Ok(BotResponse::ignore()),
        }
    }

    /// Classify the user and dispatch to the matching stage handler.
    async fn handle_stage(&self, action: &UserAction) -> Result<BotResponse, FormflowError> {
        let record = self.store.get(&action.user_id).await?;
        let stage = classify(record.as_ref());
        debug!(user_id = %action.user_id, %stage, "dispatching stage");
        match stage {
            Stage::FirstTime => self.handle_first_time(action).await,
            Stage::ProvideField => {
                // classify returned ProvideField, so the record exists.
                let record = record
                    .ok_or_else(|| FormflowError::Internal("provide_field without record".into()))?;
                self.handle_provide_field(action, record).await
            }
            Stage::SecondInteraction => {
                self.handle_second_interaction(action, Delivery::Message).await
            }
            Stage::FollowUp => self.handle_follow_up(action).await,
            Stage::Completed => Ok(self.handle_completed()),
        }
    }

    /// First contact: persist a pending record and send the welcome.
    async fn handle_first_time(&self, action: &UserAction) -> Result<BotResponse, FormflowError> {
        let name = Self::display_name(action);
        self.store
            .create(&action.user_id, name, FormStatus::Pending)
            .await?;
        let (text, buttons) = self.templates.welcome(name);
        Ok(BotResponse::message(text).with_buttons(buttons))
    }

    /// Collect the missing email. Extraction failure is non-fatal; the
    /// user stays in this stage and is re-prompted.
    async fn handle_provide_field(
        &self,
        action: &UserAction,
        mut record: UserRecord,
    ) -> Result<BotResponse, FormflowError> {
        let Some(text) = action.text() else {
            return Ok(BotResponse::message(messages::EMAIL_PROMPT));
        };

        let email = match self.extractor.extract(text).await {
            Ok(found) => found,
            Err(e) => {
                warn!(user_id = %action.user_id, error = %e, "email extraction failed");
                None
            }
        };
        let Some(email) = email else {
            return Ok(BotResponse::message(messages::EMAIL_STILL_MISSING));
        };

        let mut patch = UserPatch::default().email(&email);
        if record.name.trim().is_empty() {
            // Backfill the profile name from the platform display name so
            // the email is the only field the user must type.
            patch = patch.name(Self::display_name(action));
        }
        self.store.update(&action.user_id, patch.clone()).await?;
        patch.apply_to(&mut record);

        if record.has_complete_info() {
            self.handle_second_interaction(action, Delivery::Message).await
        } else {
            Ok(BotResponse::message(messages::EMAIL_STILL_MISSING))
        }
    }

    /// Advance the interaction marker and send the main form/CTA message.
    async fn handle_second_interaction(
        &self,
        action: &UserAction,
        delivery: Delivery,
    ) -> Result<BotResponse, FormflowError> {
        self.store.mark_follow_up_sent(&action.user_id).await?;
        let (text, buttons) = self
            .templates
            .form(Self::display_name(action), self.form_url());
        let response = match delivery {
            Delivery::Edit => BotResponse::edit(text),
            _ => BotResponse::message(text),
        };
        Ok(response.with_buttons(buttons))
    }

    /// Advance the interaction marker and send the reminder. Identical
    /// whether triggered by a live message or the cron sweep.
    async fn handle_follow_up(&self, action: &UserAction) -> Result<BotResponse, FormflowError> {
        self.store.mark_follow_up_sent(&action.user_id).await?;
        let (text, buttons) = self
            .templates
            .reminder(Self::display_name(action), self.form_url());
        Ok(BotResponse::message(text).with_buttons(buttons))
    }

    /// Fixed thank-you, no mutation.
    fn handle_completed(&self) -> BotResponse {
        BotResponse::message(messages::THANK_YOU)
    }

    /// Text-message gating. Most pending users only get a reply on a
    /// slash command so human-operator conversation can continue
    /// undisturbed; the collection stages always reply.
    async fn handle_text_message(&self, action: &UserAction) -> Result<BotResponse, FormflowError> {
        if let Some(text) = action.text() {
            if text.to_lowercase().contains(messages::COMPLETION_PHRASE) {
                let callback = UserAction::new(
                    action.user_id.clone(),
                    action.user_name.clone(),
                    ActionType::Callback,
                    Some(messages::CALLBACK_FORM_FILLED.to_string()),
                );
                return self.handle_callback(&callback).await;
            }
        }

        let record = self.store.get(&action.user_id).await?;
        let stage = classify(record.as_ref());
        match stage {
            Stage::FirstTime => self.handle_first_time(action).await,
            Stage::ProvideField => {
                let record = record
                    .ok_or_else(|| FormflowError::Internal("provide_field without record".into()))?;
                self.handle_provide_field(action, record).await
            }
            Stage::Completed => match action.text() {
                Some(text) if text.starts_with("/support") => {
                    Ok(BotResponse::message(messages::SUPPORT))
                }
                _ => Ok(BotResponse::ignore()),
            },
            Stage::SecondInteraction | Stage::FollowUp => match action.text() {
                Some(text) if text.starts_with("/support") => {
                    Ok(BotResponse::message(messages::SUPPORT))
                }
                Some(text)
                    if messages::RECOGNIZED_COMMANDS
                        .iter()
                        .any(|cmd| text.starts_with(cmd)) =>
                {
                    match stage {
                        Stage::SecondInteraction => {
                            self.handle_second_interaction(action, Delivery::Message).await
                        }
                        _ => self.handle_follow_up(action).await,
                    }
                }
                _ => Ok(BotResponse::ignore()),
            },
        }
    }

    /// Button callbacks.
    async fn handle_callback(&self, action: &UserAction) -> Result<BotResponse, FormflowError> {
        match action.data.as_deref() {
            Some(messages::CALLBACK_WELCOME_START) => {
                self.handle_second_interaction(action, Delivery::Edit).await
            }
            Some(messages::CALLBACK_FORM_FILLED) => self.handle_form_filled(action).await,
            _ => Ok(BotResponse::message(messages::UNKNOWN_ACTION)),
        }
    }

    /// Self-reported completion. The store is the authority: without a
    /// confirmed submission the record is left untouched and the current
    /// stage's content is re-rendered instead.
    async fn handle_form_filled(&self, action: &UserAction) -> Result<BotResponse, FormflowError> {
        let record = self.store.get(&action.user_id).await?;
        let submitted = matches!(
            record.as_ref().map(|r| &r.form_status),
            Some(FormStatus::Submitted)
        );
        if submitted {
            return Ok(BotResponse::edit(messages::THANK_YOU));
        }
        debug!(user_id = %action.user_id, "form_filled without confirmed submission");
        match classify(record.as_ref()) {
            // A first contact still creates the record, whatever the text.
            Stage::FirstTime => self.handle_first_time(action).await,
            stage => Ok(self.render_stage_content(action, stage)),
        }
    }

    /// Render the content a stage would show, without any record
    /// mutation. Used when a self-reported completion is not confirmed.
    fn render_stage_content(&self, action: &UserAction, stage: Stage) -> BotResponse {
        let name = Self::display_name(action);
        match stage {
            Stage::FirstTime => {
                let (text, buttons) = self.templates.welcome(name);
                BotResponse::message(text).with_buttons(buttons)
            }
            Stage::ProvideField => BotResponse::message(messages::EMAIL_PROMPT),
            Stage::SecondInteraction => {
                let (text, buttons) = self.templates.form(name, self.form_url());
                BotResponse::message(text).with_buttons(buttons)
            }
            Stage::FollowUp => {
                let (text, buttons) = self.templates.reminder(name, self.form_url());
                BotResponse::message(text).with_buttons(buttons)
            }
            Stage::Completed => self.handle_completed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow_test_utils::{MockExtractor, MockRecordStore};

    fn orchestrator(
        store: Arc<MockRecordStore>,
        extractor: Arc<MockExtractor>,
    ) -> Orchestrator {
        Orchestrator::new(
            store,
            extractor,
            TemplateSet::builtin().unwrap(),
            Some("https://forms.example/f".into()),
        )
    }

    fn text_action(user_id: &str, text: &str) -> UserAction {
        UserAction::new(user_id, "Minh", ActionType::TextMessage, Some(text.into()))
    }

    #[tokio::test]
    async fn start_creates_pending_record_and_sends_welcome() {
        let store = Arc::new(MockRecordStore::new());
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let action = UserAction::new("u1", "Minh", ActionType::Start, Some("/start".into()));
        let response = bot.handle_action(&action).await.unwrap();

        let record = store.record("u1").await.expect("record created");
        assert_eq!(record.form_status, FormStatus::Pending);
        assert_eq!(classify(Some(&record)), Stage::ProvideField);
        assert_eq!(response.delivery, Delivery::Message);
        assert!(response.text.contains("Minh"));
        assert_eq!(response.buttons[0].value, messages::CALLBACK_WELCOME_START);
    }

    #[tokio::test]
    async fn blank_user_name_falls_back_to_default() {
        let store = Arc::new(MockRecordStore::new());
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let action = UserAction::new("u1", "  ", ActionType::Start, None);
        let response = bot.handle_action(&action).await.unwrap();
        assert!(response.text.contains(DEFAULT_USER_NAME));
    }

    #[tokio::test]
    async fn extracted_email_advances_to_second_interaction() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.name = "A".into();
        store.insert(record).await;
        let extractor = Arc::new(MockExtractor::new());
        extractor.set_result(Some("a@b.com")).await;
        let bot = orchestrator(store.clone(), extractor);

        let response = bot
            .handle_action(&text_action("u1", "my email is a@b.com"))
            .await
            .unwrap();

        let record = store.record("u1").await.unwrap();
        assert_eq!(record.email, "a@b.com");
        assert!(record.last_follow_up_sent.is_some());
        assert_eq!(classify(Some(&record)), Stage::FollowUp);
        // Response is the form/CTA template with the survey link.
        assert!(response
            .buttons
            .iter()
            .any(|b| b.value == "https://forms.example/f"));
    }

    #[tokio::test]
    async fn unextracted_text_reprompts_for_email() {
        let store = Arc::new(MockRecordStore::new());
        store.insert(UserRecord::new_pending("u1", "Minh")).await;
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let response = bot.handle_action(&text_action("u1", "hello")).await.unwrap();
        assert_eq!(response.text, messages::EMAIL_STILL_MISSING);
        let record = store.record("u1").await.unwrap();
        assert_eq!(classify(Some(&record)), Stage::ProvideField);
    }

    #[tokio::test]
    async fn extractor_failure_is_nonfatal() {
        let store = Arc::new(MockRecordStore::new());
        store.insert(UserRecord::new_pending("u1", "Minh")).await;
        let extractor = Arc::new(MockExtractor::new());
        extractor.fail_next().await;
        let bot = orchestrator(store.clone(), extractor);

        let response = bot.handle_action(&text_action("u1", "a@b.com")).await.unwrap();
        assert_eq!(response.text, messages::EMAIL_STILL_MISSING);
    }

    #[tokio::test]
    async fn second_interaction_handler_is_idempotent() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.name = "Minh".into();
        record.email = "a@b.com".into();
        store.insert(record).await;
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));
        let action = UserAction::new("u1", "Minh", ActionType::Start, None);

        bot.handle_action(&action).await.unwrap();
        let after_first = classify(store.record("u1").await.as_ref());
        bot.handle_action(&action).await.unwrap();
        let after_second = classify(store.record("u1").await.as_ref());

        // Monotonic field overwrite: repeating the handler re-yields the
        // same classification, never a different one.
        assert_eq!(after_first, Stage::FollowUp);
        assert_eq!(after_second, Stage::FollowUp);
    }

    #[tokio::test]
    async fn completed_user_plain_text_is_ignored() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.form_status = FormStatus::Submitted;
        store.insert(record).await;
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let response = bot.handle_action(&text_action("u1", "hello")).await.unwrap();
        assert_eq!(response.delivery, Delivery::Ignore);
        assert!(response.text.is_empty());
    }

    #[tokio::test]
    async fn completed_user_support_command_gets_a_reply() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.form_status = FormStatus::Submitted;
        store.insert(record).await;
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let response = bot
            .handle_action(&text_action("u1", "/support please"))
            .await
            .unwrap();
        assert_eq!(response.text, messages::SUPPORT);
    }

    #[tokio::test]
    async fn pending_user_plain_text_is_ignored_after_collection() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.name = "Minh".into();
        record.email = "a@b.com".into();
        record.last_follow_up_sent = Some("2026-08-01T10:00:00+07:00".into());
        store.insert(record).await;
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let response = bot.handle_action(&text_action("u1", "hello")).await.unwrap();
        assert_eq!(response.delivery, Delivery::Ignore);
    }

    #[tokio::test]
    async fn completion_phrase_routes_to_form_filled_callback() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.form_status = FormStatus::Submitted;
        store.insert(record).await;
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let response = bot
            .handle_action(&text_action("u1", "Tôi ĐÃ điền form rồi nhé"))
            .await
            .unwrap();
        assert_eq!(response.text, messages::THANK_YOU);
        assert_eq!(response.delivery, Delivery::Edit);
    }

    #[tokio::test]
    async fn completion_phrase_from_first_contact_creates_the_record() {
        let store = Arc::new(MockRecordStore::new());
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let response = bot
            .handle_action(&text_action("u1", "tôi đã điền form"))
            .await
            .unwrap();

        // First contact persists the record, so the welcome_start
        // callback that follows has a row to advance.
        let record = store.record("u1").await.expect("record created");
        assert_eq!(record.form_status, FormStatus::Pending);
        assert_eq!(response.buttons[0].value, messages::CALLBACK_WELCOME_START);

        let follow = UserAction::new(
            "u1",
            "Minh",
            ActionType::Callback,
            Some(messages::CALLBACK_WELCOME_START.into()),
        );
        assert!(bot.handle_action(&follow).await.is_ok());
    }

    #[tokio::test]
    async fn welcome_start_callback_edits_in_place() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.name = "Minh".into();
        record.email = "a@b.com".into();
        store.insert(record).await;
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let action = UserAction::new(
            "u1",
            "Minh",
            ActionType::Callback,
            Some(messages::CALLBACK_WELCOME_START.into()),
        );
        let response = bot.handle_action(&action).await.unwrap();
        assert_eq!(response.delivery, Delivery::Edit);
        assert!(store.record("u1").await.unwrap().last_follow_up_sent.is_some());
    }

    #[tokio::test]
    async fn form_filled_without_store_confirmation_does_not_complete() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.name = "Minh".into();
        record.email = "a@b.com".into();
        store.insert(record).await;
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let action = UserAction::new(
            "u1",
            "Minh",
            ActionType::Callback,
            Some(messages::CALLBACK_FORM_FILLED.into()),
        );
        let response = bot.handle_action(&action).await.unwrap();

        let record = store.record("u1").await.unwrap();
        assert_eq!(record.form_status, FormStatus::Pending);
        // Current stage content is re-rendered, no thank-you.
        assert_ne!(response.text, messages::THANK_YOU);
        // The re-render must not advance the interaction marker.
        assert!(record.last_follow_up_sent.is_none());
    }

    #[tokio::test]
    async fn form_filled_with_confirmed_submission_thanks_the_user() {
        let store = Arc::new(MockRecordStore::new());
        let mut record = UserRecord::new_pending("u1", "Minh");
        record.form_status = FormStatus::Submitted;
        store.insert(record).await;
        let bot = orchestrator(store.clone(), Arc::new(MockExtractor::new()));

        let action = UserAction::new(
            "u1",
            "Minh",
            ActionType::Callback,
            Some(messages::CALLBACK_FORM_FILLED.into()),
        );
        let response = bot.handle_action(&action).await.unwrap();
        assert_eq!(response.text, messages::THANK_YOU);
        assert_eq!(response.delivery, Delivery::Edit);
    }

    #[tokio::test]
    async fn unknown_callback_data_gets_a_fallback() {
        let store = Arc::new(MockRecordStore::new());
        let bot = orchestrator(store, Arc::new(MockExtractor::new()));

        let action = UserAction::new("u1", "Minh", ActionType::Callback, Some("nope".into()));
        let response = bot.handle_action(&action).await.unwrap();
        assert_eq!(response.text, messages::UNKNOWN_ACTION);
    }

    #[tokio::test]
    async fn unknown_action_type_is_ignored() {
        let store = Arc::new(MockRecordStore::new());
        let bot = orchestrator(store, Arc::new(MockExtractor::new()));

        let action = UserAction::new("u1", "Minh", ActionType::Unknown, None);
        let response = bot.handle_action(&action).await.unwrap();
        assert_eq!(response.delivery, Delivery::Ignore);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = Arc::new(MockRecordStore::new());
        store.fail_next().await;
        let bot = orchestrator(store, Arc::new(MockExtractor::new()));

        let action = UserAction::new("u1", "Minh", ActionType::Start, None);
        assert!(bot.handle_action(&action).await.is_err());
    }
}
