// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits implemented by the external collaborators.

pub mod extract;
pub mod gateway;
pub mod store;

pub use extract::EmailExtractor;
pub use gateway::MessagingGateway;
pub use store::RecordStore;
