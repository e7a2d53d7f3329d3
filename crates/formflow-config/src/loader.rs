// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./formflow.toml` > `~/.config/formflow/formflow.toml`
//! > `/etc/formflow/formflow.toml`, with environment variable overrides via
//! the `FORMFLOW_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FormflowConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/formflow/formflow.toml` (system-wide)
/// 3. `~/.config/formflow/formflow.toml` (user XDG config)
/// 4. `./formflow.toml` (local directory)
/// 5. `FORMFLOW_*` environment variables
pub fn load_config() -> Result<FormflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FormflowConfig::default()))
        .merge(Toml::file("/etc/formflow/formflow.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("formflow/formflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("formflow.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FormflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FormflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FormflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FormflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FORMFLOW_FOLLOW_UP_THRESHOLD_SECS`
/// must map to `follow_up.threshold_secs`, not `follow.up_threshold_secs`.
fn env_provider() -> Env {
    Env::prefixed("FORMFLOW_").map(|key| {
        // Figment hands over the env var name in its original case with
        // the prefix stripped; normalize before matching sections.
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("server_", "server.", 1)
            .replacen("sheets_", "sheets.", 1)
            .replacen("zalo_", "zalo.", 1)
            .replacen("form_", "form.", 1)
            .replacen("follow_up_", "follow_up.", 1)
            .replacen("rate_limit_", "rate_limit.", 1)
            .replacen("extractor_", "extractor.", 1)
            .into();
        mapped
    })
}
