// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the formflow funnel bot.

use thiserror::Error;

/// The primary error type used across formflow traits and core operations.
///
/// Public entry points (webhook pipeline, cron sweeps) never let these
/// escape uncaught; they are converted into structured success/failure
/// results at the boundary.
#[derive(Debug, Error)]
pub enum FormflowError {
    /// Configuration errors (missing required fields, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Record store errors (spreadsheet API failure, malformed rows).
    #[error("store error: {message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Messaging gateway errors (transport failure, rejected payload).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Email extractor errors (API failure, unparseable response).
    #[error("extractor error: {message}")]
    Extractor {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FormflowError {
    /// Shorthand for a store error without an underlying source.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a gateway error without an underlying source.
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an extractor error without an underlying source.
    pub fn extractor(message: impl Into<String>) -> Self {
        Self::Extractor {
            message: message.into(),
            source: None,
        }
    }
}
