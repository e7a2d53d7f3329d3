// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for the spreadsheet-backed user table.
//!
//! The backing transport is slow (every call is a network round trip) and
//! not strongly consistent under concurrent writers. Callers treat each
//! mutation as an idempotent whole-field overwrite and never read-modify-
//! write across calls.

use async_trait::async_trait;

use crate::error::FormflowError;
use crate::time;
use crate::types::{FormStatus, UserPatch, UserRecord};

/// Key-value user record store keyed by platform identity.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record by identity. `None` means the user is first-time.
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, FormflowError>;

    /// All stored user records, in sheet order.
    async fn list_all(&self) -> Result<Vec<UserRecord>, FormflowError>;

    /// Create a record for a first-seen identity.
    async fn create(
        &self,
        user_id: &str,
        username: &str,
        status: FormStatus,
    ) -> Result<(), FormflowError>;

    /// Apply a partial update to an existing record.
    async fn update(&self, user_id: &str, patch: UserPatch) -> Result<(), FormflowError>;

    /// The authoritative external submission dataset, used by the
    /// reconciliation sweep. Matched against stored users by `username`.
    async fn list_responses(&self) -> Result<Vec<UserRecord>, FormflowError>;

    /// Mark a user's form submitted, stamping the submission time.
    async fn mark_form_submitted(&self, user_id: &str) -> Result<(), FormflowError> {
        let now = time::now_local().to_rfc3339();
        self.update(
            user_id,
            UserPatch::default()
                .form_status(FormStatus::Submitted)
                .form_submitted_at(now),
        )
        .await
    }

    /// Advance `last_follow_up_sent` to now.
    async fn mark_follow_up_sent(&self, user_id: &str) -> Result<(), FormflowError> {
        let now = time::now_local().to_rfc3339();
        self.update(user_id, UserPatch::default().last_follow_up_sent(now))
            .await
    }
}
