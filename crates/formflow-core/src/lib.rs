// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the formflow funnel bot.
//!
//! Defines the durable user record model, the ephemeral action/response
//! types exchanged between the webhook layer and the orchestrator, the
//! derived funnel stage and its classifier, and the capability traits
//! implemented by the external collaborators (record store, messaging
//! gateway, email extractor).

pub mod error;
pub mod stage;
pub mod time;
pub mod traits;
pub mod types;

pub use error::FormflowError;
pub use stage::{classify, Stage};
pub use traits::{EmailExtractor, MessagingGateway, RecordStore};
pub use types::{
    ActionType, BotResponse, Button, ButtonKind, Delivery, FormStatus, UserAction, UserPatch,
    UserRecord,
};
