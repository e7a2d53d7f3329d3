// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! The inbound transport is deliberately thin: normalize the payload,
//! rate-limit, acknowledge fast, and push the real work onto a background
//! task. The transport never sees a business failure.

pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, GatewayState};
