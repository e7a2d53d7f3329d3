// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-column row codec for the user worksheet.
//!
//! Column order: `id, username, name, email, form_status,
//! form_submitted_at, last_follow_up_sent, created_at`. Empty cells map to
//! empty strings / `None`; rows shorter than eight cells are padded so that
//! hand-edited sheets still parse.

use formflow_core::types::{FormStatus, UserRecord};

/// Header row of the user worksheet, in contract order.
pub const COLUMNS: [&str; 8] = [
    "id",
    "username",
    "name",
    "email",
    "form_status",
    "form_submitted_at",
    "last_follow_up_sent",
    "created_at",
];

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("").trim()
}

fn optional_cell(row: &[String], idx: usize) -> Option<String> {
    let value = cell(row, idx);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Decode one data row. Returns `None` when the `id` cell is empty
/// (blank or half-deleted rows are skipped, not errors).
pub fn row_to_record(row: &[String]) -> Option<UserRecord> {
    let id = cell(row, 0);
    if id.is_empty() {
        return None;
    }
    Some(UserRecord {
        id: id.to_string(),
        username: cell(row, 1).to_string(),
        name: cell(row, 2).to_string(),
        email: cell(row, 3).to_string(),
        form_status: FormStatus::parse(cell(row, 4)),
        form_submitted_at: optional_cell(row, 5),
        last_follow_up_sent: optional_cell(row, 6),
        created_at: optional_cell(row, 7),
    })
}

/// Encode a record as a full eight-cell row.
pub fn record_to_row(record: &UserRecord) -> Vec<String> {
    vec![
        record.id.clone(),
        record.username.clone(),
        record.name.clone(),
        record.email.clone(),
        record.form_status.as_str().to_string(),
        record.form_submitted_at.clone().unwrap_or_default(),
        record.last_follow_up_sent.clone().unwrap_or_default(),
        record.created_at.clone().unwrap_or_default(),
    ]
}
