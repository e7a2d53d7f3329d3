// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-completions client behind the [`EmailExtractor`] trait.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use formflow_config::model::ExtractorConfig;
use formflow_core::error::FormflowError;
use formflow_core::traits::EmailExtractor;

use crate::validate::normalize_email;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

fn build_prompt(text: &str) -> String {
    format!(
        "From the following message, extract EMAIL:\n\
         \"{text}\"\n\n\
         Rules:\n\
         - Email: must be in a valid format with @ and domain\n\
         - If not found, return null\n\n\
         Return in strict JSON format:\n\
         {{\"email\": \"email or null\"}}"
    )
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

pub struct LlmExtractor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmExtractor {
    /// Build from config. Errors when no API key is configured; callers
    /// fall back to [`DisabledExtractor`] in that case.
    pub fn new(config: &ExtractorConfig) -> Result<Self, FormflowError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| FormflowError::Config("extractor.api_key is not set".into()))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FormflowError::Extractor {
                message: format!("failed to build extractor client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Strip an optional markdown code fence around the model's JSON.
    fn unfence(content: &str) -> &str {
        let trimmed = content.trim();
        trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|rest| rest.strip_suffix("```"))
            .map(str::trim)
            .unwrap_or(trimmed)
    }
}

#[async_trait]
impl EmailExtractor for LlmExtractor {
    async fn extract(&self, text: &str) -> Result<Option<String>, FormflowError> {
        let prompt = build_prompt(text);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.0,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FormflowError::Extractor {
                message: format!("extraction request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FormflowError::extractor(format!(
                "extraction request returned {status}"
            )));
        }

        let chat: ChatResponse = resp.json().await.map_err(|e| FormflowError::Extractor {
            message: format!("extraction response unreadable: {e}"),
            source: Some(Box::new(e)),
        })?;
        let Some(content) = chat.choices.first().and_then(|c| c.message.content.clone()) else {
            return Err(FormflowError::extractor("extraction response had no content"));
        };

        let parsed: Value = match serde_json::from_str(Self::unfence(&content)) {
            Ok(value) => value,
            Err(e) => {
                // Models drift out of strict-JSON mode sometimes; treat
                // that as "nothing found" rather than a hard failure.
                warn!(error = %e, "extractor returned non-JSON content");
                return Ok(None);
            }
        };
        let email = parsed
            .get("email")
            .and_then(Value::as_str)
            .and_then(normalize_email);
        debug!(found = email.is_some(), "email extraction complete");
        Ok(email)
    }
}

/// Stand-in used when no API key is configured. Never finds an email.
pub struct DisabledExtractor;

#[async_trait]
impl EmailExtractor for DisabledExtractor {
    async fn extract(&self, _text: &str) -> Result<Option<String>, FormflowError> {
        warn!("email extraction disabled: no API key configured");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> ExtractorConfig {
        ExtractorConfig {
            api_key: Some("sk-test".into()),
            model: "gpt-4o-mini".into(),
            base_url: server.uri(),
            max_tokens: 200,
        }
    }

    fn chat_reply(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [ { "message": { "role": "assistant", "content": content } } ]
        })
    }

    #[tokio::test]
    async fn extracts_email_from_json_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_reply(r#"{"email": "Test@Gmail.com"}"#)),
            )
            .mount(&server)
            .await;

        let extractor = LlmExtractor::new(&config(&server)).unwrap();
        let email = extractor.extract("nguyễn văn a test@gmail.com").await.unwrap();
        assert_eq!(email, Some("test@gmail.com".to_string()));
    }

    #[tokio::test]
    async fn null_email_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_reply(r#"{"email": null}"#)),
            )
            .mount(&server)
            .await;

        let extractor = LlmExtractor::new(&config(&server)).unwrap();
        assert_eq!(extractor.extract("xin chào").await.unwrap(), None);
    }

    #[tokio::test]
    async fn fenced_json_is_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
                "```json\n{\"email\": \"a@b.com\"}\n```",
            )))
            .mount(&server)
            .await;

        let extractor = LlmExtractor::new(&config(&server)).unwrap();
        assert_eq!(
            extractor.extract("a@b.com").await.unwrap(),
            Some("a@b.com".to_string())
        );
    }

    #[tokio::test]
    async fn invalid_domain_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_reply(r#"{"email": "minh@localhost"}"#)),
            )
            .mount(&server)
            .await;

        let extractor = LlmExtractor::new(&config(&server)).unwrap();
        assert_eq!(extractor.extract("minh@localhost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn non_json_content_is_nothing_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_reply("I could not find an email.")),
            )
            .mount(&server)
            .await;

        let extractor = LlmExtractor::new(&config(&server)).unwrap();
        assert_eq!(extractor.extract("hello").await.unwrap(), None);
    }

    #[tokio::test]
    async fn http_error_is_an_extractor_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let extractor = LlmExtractor::new(&config(&server)).unwrap();
        assert!(extractor.extract("hello").await.is_err());
    }

    #[tokio::test]
    async fn missing_api_key_fails_construction() {
        let config = ExtractorConfig {
            api_key: None,
            model: "gpt-4o-mini".into(),
            base_url: "https://api.openai.com/v1/chat/completions".into(),
            max_tokens: 200,
        };
        assert!(LlmExtractor::new(&config).is_err());
    }

    #[tokio::test]
    async fn disabled_extractor_finds_nothing() {
        assert_eq!(DisabledExtractor.extract("a@b.com").await.unwrap(), None);
    }
}
