// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for formflow integration tests.
//!
//! Provides in-memory mock collaborators for fast, deterministic,
//! CI-runnable tests without a spreadsheet or messaging platform.
//!
//! # Components
//!
//! - [`MockRecordStore`] - In-memory record store with injectable rows
//! - [`MockGateway`] - Messaging gateway capturing sent responses
//! - [`MockExtractor`] - Email extractor with a scripted result

pub mod mock_extractor;
pub mod mock_gateway;
pub mod mock_store;

pub use mock_extractor::MockExtractor;
pub use mock_gateway::MockGateway;
pub use mock_store::MockRecordStore;
