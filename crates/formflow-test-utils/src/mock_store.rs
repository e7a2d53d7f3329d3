// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory mock record store for deterministic testing.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use formflow_core::error::FormflowError;
use formflow_core::traits::RecordStore;
use formflow_core::types::{FormStatus, UserPatch, UserRecord};

/// A mock record store backed by a `BTreeMap` (stable iteration order so
/// sweep tests are deterministic).
///
/// `fail_next` makes the next store call return a transient error, for
/// exercising the error taxonomy.
#[derive(Default)]
pub struct MockRecordStore {
    records: Arc<Mutex<BTreeMap<String, UserRecord>>>,
    responses: Arc<Mutex<Vec<UserRecord>>>,
    fail_next: Arc<Mutex<bool>>,
    fail_update_for: Arc<Mutex<Option<String>>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing `create`.
    pub async fn insert(&self, record: UserRecord) {
        self.records.lock().await.insert(record.id.clone(), record);
    }

    /// Seed the external form-response dataset.
    pub async fn set_responses(&self, responses: Vec<UserRecord>) {
        *self.responses.lock().await = responses;
    }

    /// Make the next store operation fail with a transient error.
    pub async fn fail_next(&self) {
        *self.fail_next.lock().await = true;
    }

    /// Make the next `update` targeting this user fail, leaving every
    /// other operation untouched. Exercises mid-sweep failures.
    pub async fn fail_update_for(&self, user_id: &str) {
        *self.fail_update_for.lock().await = Some(user_id.to_string());
    }

    /// Snapshot of a stored record for assertions.
    pub async fn record(&self, user_id: &str) -> Option<UserRecord> {
        self.records.lock().await.get(user_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    async fn check_fail(&self) -> Result<(), FormflowError> {
        let mut flag = self.fail_next.lock().await;
        if *flag {
            *flag = false;
            return Err(FormflowError::store("mock store failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, FormflowError> {
        self.check_fail().await?;
        Ok(self.records.lock().await.get(user_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, FormflowError> {
        self.check_fail().await?;
        Ok(self.records.lock().await.values().cloned().collect())
    }

    async fn create(
        &self,
        user_id: &str,
        username: &str,
        status: FormStatus,
    ) -> Result<(), FormflowError> {
        self.check_fail().await?;
        let mut record = UserRecord::new_pending(user_id, username);
        record.form_status = status;
        self.records.lock().await.insert(user_id.to_string(), record);
        Ok(())
    }

    async fn update(&self, user_id: &str, patch: UserPatch) -> Result<(), FormflowError> {
        self.check_fail().await?;
        {
            let mut target = self.fail_update_for.lock().await;
            if target.as_deref() == Some(user_id) {
                *target = None;
                return Err(FormflowError::store(format!(
                    "mock update failure for {user_id}"
                )));
            }
        }
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(user_id)
            .ok_or_else(|| FormflowError::store(format!("update for unknown user {user_id}")))?;
        patch.apply_to(record);
        Ok(())
    }

    async fn list_responses(&self) -> Result<Vec<UserRecord>, FormflowError> {
        self.check_fail().await?;
        Ok(self.responses.lock().await.clone())
    }
}
