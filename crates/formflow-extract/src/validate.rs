// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email normalization shared by the extractor implementations.

/// Trim, lowercase, and validate an extracted email candidate.
///
/// Accepts only `local@domain` where the domain contains a dot. Returns
/// `None` for anything else; the model occasionally hallucinates a bare
/// word or the literal string "null".
pub fn normalize_email(candidate: &str) -> Option<String> {
    let email = candidate.trim().to_lowercase();
    if email.is_empty() || email == "null" {
        return None;
    }
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return None;
    }
    // A second '@' means the model glued two tokens together.
    if domain.contains('@') {
        return None;
    }
    Some(email)
}
