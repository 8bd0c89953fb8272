//! Answer-synthesis providers.
//!
//! - **[`DisabledSynthesizer`]** — always fails; used when `synthesis.provider = "disabled"`.
//! - **[`OpenAiSynthesizer`]** — calls an OpenAI-compatible `/chat/completions` endpoint.
//!
//! Providers receive their settings and API key at construction. Nothing in
//! this module reads the environment.
//!
//! # Retry Strategy
//!
//! Retrying is off unless `synthesis.max_retries > 0`. When enabled:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use docqa_core::{AnswerSynthesizer, SynthesisError};

use crate::config::{SynthesisConfig, SynthesisProvider};

/// A synthesizer that refuses every request.
pub struct DisabledSynthesizer;

#[async_trait]
impl AnswerSynthesizer for DisabledSynthesizer {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn synthesize(&self, _question: &str, _context: &str) -> Result<String, SynthesisError> {
        Err(SynthesisError::Disabled)
    }
}

/// Chat-completion synthesizer for OpenAI-compatible APIs.
pub struct OpenAiSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    system_prompt: String,
    max_retries: u32,
}

impl OpenAiSynthesizer {
    /// Build a synthesizer from explicit settings.
    ///
    /// # Errors
    ///
    /// [`SynthesisError::Http`] if the HTTP client cannot be constructed.
    pub fn new(config: &SynthesisConfig, api_key: String) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
            max_retries: config.max_retries,
        })
    }

    fn request_body(&self, question: &str, context: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": user_message(question, context) },
            ],
            "max_tokens": self.max_tokens,
        })
    }
}

/// The user turn sent to the model.
pub fn user_message(question: &str, context: &str) -> String {
    format!("Document Context: {}\n\nQuestion: {}", context, question)
}

#[async_trait]
impl AnswerSynthesizer for OpenAiSynthesizer {
    fn name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, question: &str, context: &str) -> Result<String, SynthesisError> {
        let body = self.request_body(question, context);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                debug!(attempt, delay_secs = delay.as_secs(), "retrying chat completion");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response
                            .json()
                            .await
                            .map_err(|e| SynthesisError::MalformedResponse(e.to_string()))?;
                        return parse_chat_response(&json);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = SynthesisError::Status {
                        status: status.as_u16(),
                        body: body_text,
                    };

                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(status = status.as_u16(), attempt, "chat completion failed");
                        last_err = Some(err);
                        continue;
                    }

                    return Err(err);
                }
                Err(e) => {
                    warn!(error = %e, attempt, "chat completion request failed");
                    last_err = Some(SynthesisError::Http(e.to_string()));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| SynthesisError::Http("no attempts made".to_string())))
    }
}

/// Extract `choices[0].message.content`, trimmed.
pub fn parse_chat_response(json: &serde_json::Value) -> Result<String, SynthesisError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| {
            SynthesisError::MalformedResponse("missing choices[0].message.content".to_string())
        })
}

/// Create the configured [`AnswerSynthesizer`].
///
/// # Errors
///
/// [`SynthesisError::MissingApiKey`] when the OpenAI provider is selected
/// and `api_key` is `None`.
pub fn create_synthesizer(
    config: &SynthesisConfig,
    api_key: Option<String>,
) -> Result<Box<dyn AnswerSynthesizer>, SynthesisError> {
    match config.provider {
        SynthesisProvider::Disabled => Ok(Box::new(DisabledSynthesizer)),
        SynthesisProvider::Openai => {
            let key = api_key.ok_or_else(|| SynthesisError::MissingApiKey {
                provider: "openai".to_string(),
            })?;
            Ok(Box::new(OpenAiSynthesizer::new(config, key)?))
        }
    }
}
