// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timer-driven sweeps, independent of request handling.
//!
//! Two concerns on separate schedules: the time-based follow-up sweep
//! (re-engage users who stalled in the funnel) and the reconciliation
//! sweep (align stored records with the authoritative submission
//! dataset). Both run as long-lived tasks until cancelled.

pub mod follow_up;
pub mod reconcile;
pub mod runner;

pub use follow_up::{FollowUpSweeper, SweepStats};
pub use reconcile::ReconcileSweeper;
pub use runner::{run_follow_up_loop, run_reconcile_loop};
