// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Funnel bot logic: per-stage orchestration, message templates, and the
//! per-user rate limiter.
//!
//! Everything here is platform-independent. Inbound events arrive as
//! normalized [`UserAction`](formflow_core::types::UserAction)s and leave
//! as [`BotResponse`](formflow_core::types::BotResponse)s; delivery is the
//! gateway's problem.

pub mod messages;
pub mod orchestrator;
pub mod pipeline;
pub mod rate_limit;
pub mod templates;

pub use orchestrator::Orchestrator;
pub use pipeline::{MessagePipeline, ProcessOutcome};
pub use rate_limit::RateLimiter;
pub use templates::TemplateSet;
