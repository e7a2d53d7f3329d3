// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived funnel stage and its classifier.
//!
//! The stage is never persisted. It is recomputed on every access from the
//! durable record fields, so it survives restarts and concurrent instances
//! and can never drift from the underlying data.

use crate::types::{FormStatus, UserRecord};

/// Funnel position of a user, derived from their record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No record exists yet.
    FirstTime,
    /// Record exists but name/email are not both collected.
    ProvideField,
    /// Profile complete, exactly one prior advancing interaction
    /// (`last_follow_up_sent` unset).
    SecondInteraction,
    /// Profile complete, two or more advancing interactions.
    FollowUp,
    /// Form submitted (or record in an unrecognized state, fail-safe).
    Completed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::FirstTime => "first_time",
            Stage::ProvideField => "provide_field",
            Stage::SecondInteraction => "second_interaction",
            Stage::FollowUp => "follow_up",
            Stage::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Classify a user into their funnel stage. First match wins.
///
/// The interaction count is a proxy derived from the presence of
/// `last_follow_up_sent`: unset means exactly one advancing interaction has
/// happened, set means two or more. No real counter exists; the follow-up
/// logic only ever needs the binary distinction.
pub fn classify(record: Option<&UserRecord>) -> Stage {
    let Some(record) = record else {
        return Stage::FirstTime;
    };
    match record.form_status {
        FormStatus::Submitted => return Stage::Completed,
        // Unrecognized status values stop the funnel rather than crash it.
        FormStatus::Unknown(_) => return Stage::Completed,
        FormStatus::Pending => {}
    }
    if !record.has_complete_info() {
        return Stage::ProvideField;
    }
    if record.last_follow_up_sent.is_none() {
        return Stage::SecondInteraction;
    }
    Stage::FollowUp
}
