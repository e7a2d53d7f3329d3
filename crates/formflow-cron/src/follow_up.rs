// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-based follow-up sweep.
//!
//! Iterates every stored user and sends the reminder to those who have
//! stalled past the threshold. A user with `last_follow_up_sent` unset is
//! never contacted by the sweep: that baseline only appears after a live
//! advancing interaction. The sweep is idempotent within a threshold
//! window because each send resets the baseline to now.

use std::sync::Arc;

use tracing::{debug, info, warn};

use formflow_bot::MessagePipeline;
use formflow_core::error::FormflowError;
use formflow_core::stage::{classify, Stage};
use formflow_core::time;
use formflow_core::traits::RecordStore;
use formflow_core::types::{ActionType, FormStatus, UserAction, UserRecord};

/// Counters from one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub scanned: usize,
    pub sent: usize,
    pub failed: usize,
}

pub struct FollowUpSweeper {
    store: Arc<dyn RecordStore>,
    pipeline: Arc<MessagePipeline>,
    threshold_secs: i64,
}

impl FollowUpSweeper {
    pub fn new(
        store: Arc<dyn RecordStore>,
        pipeline: Arc<MessagePipeline>,
        threshold_secs: i64,
    ) -> Self {
        Self {
            store,
            pipeline,
            threshold_secs,
        }
    }

    fn is_due(&self, record: &UserRecord) -> bool {
        if record.form_status == FormStatus::Submitted {
            return false;
        }
        if classify(Some(record)) != Stage::FollowUp {
            return false;
        }
        // No baseline, no time-triggered follow-up.
        let Some(last) = record.last_follow_up_at() else {
            return false;
        };
        time::elapsed_secs(time::now_local(), last) > self.threshold_secs
    }

    /// One full pass over the stored users. Per-user failures are logged
    /// and the sweep continues.
    pub async fn run_once(&self) -> Result<SweepStats, FormflowError> {
        let records = self.store.list_all().await?;
        let mut stats = SweepStats {
            scanned: records.len(),
            ..SweepStats::default()
        };

        for record in records {
            if !self.is_due(&record) {
                debug!(user_id = %record.id, "follow-up not due");
                continue;
            }
            let user_name = if record.name.trim().is_empty() {
                record.username.clone()
            } else {
                record.name.clone()
            };
            let action = UserAction::new(record.id.clone(), user_name, ActionType::FollowUp, None);
            let outcome = self.pipeline.process(&action).await;
            if outcome.success {
                stats.sent += 1;
            } else {
                warn!(user_id = %record.id, message = %outcome.message, "follow-up failed");
                stats.failed += 1;
            }
        }

        if stats.sent > 0 || stats.failed > 0 {
            info!(
                scanned = stats.scanned,
                sent = stats.sent,
                failed = stats.failed,
                "follow-up sweep complete"
            );
        }
        Ok(stats)
    }
}
