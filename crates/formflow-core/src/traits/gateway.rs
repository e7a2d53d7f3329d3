// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging gateway trait for platform delivery.

use async_trait::async_trait;

use crate::error::FormflowError;
use crate::types::BotResponse;

/// Delivers a rendered response to a user on the target platform.
///
/// Implementations honor [`Delivery`](crate::types::Delivery): platforms
/// without in-place editing deliver `Edit` as a fresh message, and
/// `Ignore` (or empty text) is a no-op. Transport failures are surfaced as
/// errors for the caller to log; the core never retries a send.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send(&self, response: &BotResponse, user_id: &str) -> Result<(), FormflowError>;
}
