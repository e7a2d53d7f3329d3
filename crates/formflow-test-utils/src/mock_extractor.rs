// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock email extractor with a scripted result.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use formflow_core::error::FormflowError;
use formflow_core::traits::EmailExtractor;

/// A mock extractor returning a fixed result.
///
/// By default every `extract()` call returns `Ok(None)`. Script a hit with
/// [`MockExtractor::returning`], or a failure with [`MockExtractor::fail_next`].
#[derive(Default)]
pub struct MockExtractor {
    result: Arc<Mutex<Option<String>>>,
    fail_next: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a mock that always returns the given email.
    pub fn returning(email: &str) -> Self {
        Self {
            result: Arc::new(Mutex::new(Some(email.to_string()))),
            ..Self::default()
        }
    }

    /// Set the email returned by subsequent calls.
    pub async fn set_result(&self, email: Option<&str>) {
        *self.result.lock().await = email.map(str::to_string);
    }

    /// Make the next call fail with an extractor error.
    pub async fn fail_next(&self) {
        *self.fail_next.lock().await = true;
    }

    /// Texts passed to `extract()`, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl EmailExtractor for MockExtractor {
    async fn extract(&self, text: &str) -> Result<Option<String>, FormflowError> {
        self.calls.lock().await.push(text.to_string());
        {
            let mut flag = self.fail_next.lock().await;
            if *flag {
                *flag = false;
                return Err(FormflowError::extractor("mock extractor failure"));
            }
        }
        Ok(self.result.lock().await.clone())
    }
}
