// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spreadsheet-backed implementation of the formflow record store.
//!
//! The user table is one worksheet with a fixed header row; every store
//! operation is a REST round trip against the spreadsheet values API.
//! Row layout is a compatibility contract shared with the reconciliation
//! sweep and must not be reordered without a migration.

pub mod rows;
pub mod sheet;

pub use sheet::SheetStore;
