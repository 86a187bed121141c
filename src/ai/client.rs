//! Upstream generative-language client.
//!
//! One small trait at the seam so handlers and tests don't care which
//! backend produces text, plus the real HTTP implementation against the
//! Generative Language REST API.

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::config::AiConfig;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured")]
    NotConfigured,
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("could not parse model response: {0}")]
    Parse(String),
}

/// Text generation boundary. `json_response` asks the backend for a raw
/// JSON body (no prose, no markdown) when it supports that.
#[async_trait]
pub trait GenerateClient: Send + Sync {
    async fn generate(&self, prompt: &str, json_response: bool) -> Result<String, AiError>;
}

/// Client for the Generative Language (`generateContent`) REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    /// Build a client from config; `None` when no API key is present.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            http: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GenerateClient for GeminiClient {
    async fn generate(&self, prompt: &str, json_response: bool) -> Result<String, AiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );

        let mut generation_config = json!({ "temperature": 0.7 });
        if json_response {
            generation_config["responseMimeType"] = json!("application/json");
        }
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        });

        debug!(model = %self.model, json_response, "calling generative-language API");
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        extract_text(&value)
    }
}

/// Pull the generated text out of a `generateContent` response, joining
/// multi-part candidates.
fn extract_text(value: &Value) -> Result<String, AiError> {
    let parts = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| AiError::Parse("response has no candidate parts".into()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        return Err(AiError::Parse("candidate contained no text".into()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_joins_parts() {
        let value = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] }
            }]
        });
        assert_eq!(extract_text(&value).unwrap(), "Hello world");
    }

    #[test]
    fn extract_text_rejects_empty_response() {
        assert!(extract_text(&json!({})).is_err());
        assert!(
            extract_text(&json!({ "candidates": [{ "content": { "parts": [] } }] })).is_err()
        );
    }

    #[test]
    fn client_requires_api_key() {
        let config = AiConfig::default();
        assert!(GeminiClient::from_config(&config).is_none());
    }
}
