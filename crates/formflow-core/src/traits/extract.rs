// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email extractor trait.

use async_trait::async_trait;

use crate::error::FormflowError;

/// Black-box extractor: free text in, optional email out.
///
/// Failure and "nothing found" are both non-fatal to the caller; the user
/// simply stays in the provide-field stage and is re-prompted.
#[async_trait]
pub trait EmailExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Option<String>, FormflowError>;
}
