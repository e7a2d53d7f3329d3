// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interval loops around the sweeps.
//!
//! Each loop ticks until its [`CancellationToken`] fires, observing
//! cancellation at the next suspension point. No cleanup is needed on
//! the way out: every sweep mutation is a single atomic field write.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::follow_up::FollowUpSweeper;
use crate::reconcile::ReconcileSweeper;

/// Run the follow-up sweep every `interval` until cancelled.
pub async fn run_follow_up_loop(
    sweeper: Arc<FollowUpSweeper>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so startup is quiet.
    ticker.tick().await;

    info!(interval_secs = interval.as_secs(), "follow-up sweep started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("follow-up sweep stopped");
                return;
            }
            _ = ticker.tick() => {
                if let Err(e) = sweeper.run_once().await {
                    warn!(error = %e, "follow-up sweep pass failed");
                }
            }
        }
    }
}

/// Run the reconciliation sweep every `interval` until cancelled.
pub async fn run_reconcile_loop(
    sweeper: Arc<ReconcileSweeper>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    info!(
        interval_secs = interval.as_secs(),
        "reconciliation sweep started"
    );
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("reconciliation sweep stopped");
                return;
            }
            _ = ticker.tick() => {
                if let Err(e) = sweeper.run_once().await {
                    warn!(error = %e, "reconciliation sweep pass failed");
                }
            }
        }
    }
}
