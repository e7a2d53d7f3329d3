// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the orchestrator, the cron sweeps, and the
//! collaborator traits.

use std::str::FromStr;

use strum::{Display, EnumString};

use crate::time;

/// Display name used when the platform does not supply one.
pub const DEFAULT_USER_NAME: &str = "Bạn";

/// Submission status of a user's form, as stored in the record store.
///
/// The store is spreadsheet-backed and may contain values this code never
/// wrote. Anything other than `pending`/`submitted` parses to `Unknown`,
/// which the classifier treats the same as submitted (fail-safe: stop
/// bothering the user rather than crash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Pending,
    Submitted,
    Unknown(String),
}

impl FormStatus {
    /// Parse a stored status cell. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "pending" => Self::Pending,
            "submitted" => Self::Submitted,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The string form written back to the store.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Unknown(raw) => raw,
        }
    }
}

impl std::fmt::Display for FormStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity-keyed durable record of one user's funnel state.
///
/// Column order in the backing store is a compatibility contract:
/// `id, username, name, email, form_status, form_submitted_at,
/// last_follow_up_sent, created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    /// Platform user identifier. Primary key, immutable.
    pub id: String,
    /// Display name, best effort.
    pub username: String,
    /// Collected profile field, empty until provided.
    pub name: String,
    /// Collected profile field, empty until provided.
    pub email: String,
    pub form_status: FormStatus,
    /// Set once, when the form submission is observed.
    pub form_submitted_at: Option<String>,
    /// Advanced whenever a stage-advancing message is sent. Monotonic.
    pub last_follow_up_sent: Option<String>,
    pub created_at: Option<String>,
}

impl UserRecord {
    /// A freshly created pending record for a first-seen user.
    pub fn new_pending(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            name: String::new(),
            email: String::new(),
            form_status: FormStatus::Pending,
            form_submitted_at: None,
            last_follow_up_sent: None,
            created_at: Some(time::now_local().to_rfc3339()),
        }
    }

    /// Both required profile fields are non-empty.
    pub fn has_complete_info(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Parsed `last_follow_up_sent`, if set and well-formed.
    pub fn last_follow_up_at(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        self.last_follow_up_sent
            .as_deref()
            .and_then(time::parse_timestamp)
    }
}

/// Partial update applied to a stored record. Unset fields are untouched.
///
/// Every mutation in the system is a whole-field overwrite through one of
/// these, never an increment, which is what makes concurrent duplicate
/// events produce at most a duplicate send instead of corrupted state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub form_status: Option<FormStatus>,
    pub form_submitted_at: Option<String>,
    pub last_follow_up_sent: Option<String>,
}

impl UserPatch {
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn form_status(mut self, status: FormStatus) -> Self {
        self.form_status = Some(status);
        self
    }

    pub fn form_submitted_at(mut self, at: impl Into<String>) -> Self {
        self.form_submitted_at = Some(at.into());
        self
    }

    pub fn last_follow_up_sent(mut self, at: impl Into<String>) -> Self {
        self.last_follow_up_sent = Some(at.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this patch to an in-memory record (used by mocks and tests;
    /// real stores apply it to the backing row).
    pub fn apply_to(&self, record: &mut UserRecord) {
        if let Some(username) = &self.username {
            record.username = username.clone();
        }
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(email) = &self.email {
            record.email = email.clone();
        }
        if let Some(status) = &self.form_status {
            record.form_status = status.clone();
        }
        if let Some(at) = &self.form_submitted_at {
            record.form_submitted_at = Some(at.clone());
        }
        if let Some(at) = &self.last_follow_up_sent {
            record.last_follow_up_sent = Some(at.clone());
        }
    }
}

/// Kind of inbound event, normalized from the platform webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ActionType {
    Start,
    TextMessage,
    Callback,
    Completed,
    FollowUp,
    Unknown,
}

impl ActionType {
    /// Lenient parse: anything unrecognized maps to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        Self::from_str(raw).unwrap_or(Self::Unknown)
    }
}

/// One normalized inbound event.
#[derive(Debug, Clone)]
pub struct UserAction {
    pub user_id: String,
    pub user_name: String,
    pub action_type: ActionType,
    /// Raw message text or callback code.
    pub data: Option<String>,
}

impl UserAction {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        action_type: ActionType,
        data: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            action_type,
            data,
        }
    }

    /// Text payload with surrounding whitespace removed, if any.
    pub fn text(&self) -> Option<&str> {
        self.data.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// How a rendered response should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Send as a new message.
    Message,
    /// Edit the triggering message in place. Platforms without in-place
    /// editing deliver this as `Message`.
    Edit,
    /// Produce no outbound message at all.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Url,
    Callback,
}

/// Platform-agnostic button attached to a response.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub text: String,
    pub kind: ButtonKind,
    /// Target URL for `Url` buttons, callback code for `Callback` buttons.
    pub value: String,
}

impl Button {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ButtonKind::Url,
            value: url.into(),
        }
    }

    pub fn callback(text: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ButtonKind::Callback,
            value: code.into(),
        }
    }
}

/// Output of orchestration for one inbound action.
#[derive(Debug, Clone, PartialEq)]
pub struct BotResponse {
    pub text: String,
    pub buttons: Vec<Button>,
    pub delivery: Delivery,
}

impl BotResponse {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
            delivery: Delivery::Message,
        }
    }

    pub fn edit(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
            delivery: Delivery::Edit,
        }
    }

    /// The deliberate no-op response: empty text, nothing sent.
    pub fn ignore() -> Self {
        Self {
            text: String::new(),
            buttons: Vec::new(),
            delivery: Delivery::Ignore,
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<Button>) -> Self {
        self.buttons = buttons;
        self
    }
}
