// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Errors are collected, not fail-fast, so a bad config file
//! reports every problem in one run.

use crate::diagnostic::ConfigError;
use crate::model::FormflowConfig;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &FormflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.follow_up.threshold_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "follow_up.threshold_secs must be greater than zero".to_string(),
        });
    }

    if config.follow_up.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "follow_up.sweep_interval_secs must be greater than zero".to_string(),
        });
    }

    if config.rate_limit.min_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "rate_limit.min_interval_secs must be greater than zero".to_string(),
        });
    }

    if config.rate_limit.retention_secs < config.rate_limit.min_interval_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "rate_limit.retention_secs ({}) must not be shorter than rate_limit.min_interval_secs ({})",
                config.rate_limit.retention_secs, config.rate_limit.min_interval_secs
            ),
        });
    }

    if let Some(url) = &config.form.url
        && !url.starts_with("http://")
        && !url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!("form.url `{url}` must be an http(s) URL"),
        });
    }

    if let Some(id) = &config.sheets.spreadsheet_id
        && id.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "sheets.spreadsheet_id must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
