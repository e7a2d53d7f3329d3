// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the formflow funnel bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, producing actionable diagnostics instead of
//! silently ignored settings.

use serde::{Deserialize, Serialize};

/// Top-level formflow configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; keys that are required for `serve` (spreadsheet id, form URL)
/// are checked at startup rather than at parse time.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FormflowConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// Webhook HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Spreadsheet record store settings.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Zalo Official Account messaging settings.
    #[serde(default)]
    pub zalo: ZaloConfig,

    /// Funnel form settings.
    #[serde(default)]
    pub form: FormConfig,

    /// Follow-up scheduling settings.
    #[serde(default)]
    pub follow_up: FollowUpConfig,

    /// Per-user webhook rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// LLM email extractor settings.
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the service.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "formflow".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Webhook HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Spreadsheet record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsConfig {
    /// Spreadsheet identifier. `None` disables the sheet store (serve fails).
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// OAuth bearer token for the Sheets API.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Base URL of the Sheets values API. Overridable for testing.
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,

    /// Worksheet holding user records.
    #[serde(default = "default_worksheet")]
    pub worksheet: String,

    /// Worksheet holding the external form-response dataset.
    #[serde(default = "default_responses_worksheet")]
    pub responses_worksheet: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            api_token: None,
            base_url: default_sheets_base_url(),
            worksheet: default_worksheet(),
            responses_worksheet: default_responses_worksheet(),
        }
    }
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
}

fn default_worksheet() -> String {
    "UserStatus".to_string()
}

fn default_responses_worksheet() -> String {
    "FormResponses".to_string()
}

/// Zalo Official Account messaging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ZaloConfig {
    /// OA access token. `None` disables outbound messaging (serve fails).
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Funnel form configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FormConfig {
    /// Public URL of the form users are funneled to.
    #[serde(default)]
    pub url: Option<String>,
}

/// Follow-up scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FollowUpConfig {
    /// Minimum elapsed seconds since the last advancing interaction before
    /// a time-triggered reminder is sent.
    #[serde(default = "default_threshold_secs")]
    pub threshold_secs: u64,

    /// How often the follow-up sweep runs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// How often the reconciliation sweep runs. This is a fallback; the
    /// form-sync webhook triggers reconciliation in near real time.
    #[serde(default = "default_reconcile_interval_secs")]
    pub reconcile_interval_secs: u64,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            threshold_secs: default_threshold_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            reconcile_interval_secs: default_reconcile_interval_secs(),
        }
    }
}

fn default_threshold_secs() -> u64 {
    86_400
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_reconcile_interval_secs() -> u64 {
    86_400
}

/// Per-user webhook rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Minimum seconds between accepted events from one identity.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,

    /// Entries idle longer than this are dropped at cleanup.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Minimum seconds between cleanup passes.
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval_secs(),
            retention_secs: default_retention_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn default_min_interval_secs() -> u64 {
    5
}

fn default_retention_secs() -> u64 {
    600
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

/// LLM email extractor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorConfig {
    /// API key for the chat completions endpoint. `None` disables
    /// extraction; users are simply re-prompted.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_extractor_model")]
    pub model: String,

    /// Chat completions endpoint URL. Overridable for testing.
    #[serde(default = "default_extractor_base_url")]
    pub base_url: String,

    /// Maximum tokens for the extraction response.
    #[serde(default = "default_extractor_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_extractor_model(),
            base_url: default_extractor_base_url(),
            max_tokens: default_extractor_max_tokens(),
        }
    }
}

fn default_extractor_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_extractor_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_extractor_max_tokens() -> u32 {
    200
}
