use std::time::Duration;

use async_trait::async_trait;
use cortex_core::config::LlmConfig;
use cortex_core::errors::{CortexError, LlmError};
use cortex_core::traits::{LlmProvider, LlmResponse};
use cortex_core::CortexResult;
use serde_json::json;

use crate::retry::retry_transient;

/// OpenAI-compatible chat-completion client. Requests JSON mode and relies on
/// the caller to validate the returned object against its own schema — most
/// providers only guarantee syntactically valid JSON, not schema conformance.
pub struct HttpLlmProvider {
    client: reqwest::Client,
    base_url: String,
    config: LlmConfig,
}

impl HttpLlmProvider {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .build()
            .expect("reqwest client builds with static config");
        Self {
            client,
            base_url: "https://api.openai.com/v1".to_string(),
            config,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn chat_once(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        response_schema: &serde_json::Value,
    ) -> Result<String, LlmError> {
        let payload = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": format!(
                    "{user_prompt}\n\nRespond with JSON matching this schema:\n{response_schema}"
                )},
            ],
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::Transient {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(LlmError::Transient {
                reason: format!("upstream returned {status}"),
            });
        }
        if status.is_client_error() {
            return Err(LlmError::Permanent {
                reason: format!("upstream returned {status}"),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| LlmError::Transient {
            reason: format!("failed to decode response body: {e}"),
        })?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| LlmError::Unparseable {
                reason: "response missing choices[0].message.content".to_string(),
            })
    }
}

#[async_trait]
impl LlmProvider for HttpLlmProvider {
    async fn extract_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        response_schema: &serde_json::Value,
    ) -> CortexResult<LlmResponse> {
        let max_retries = self.config.max_retries;
        let raw_text = retry_transient(max_retries, Duration::from_millis(500), || {
            self.chat_once(system_prompt, user_prompt, response_schema)
        })
        .await
        .map_err(|e| -> CortexError { e.into() })?;

        Ok(LlmResponse { raw_text })
    }

    fn name(&self) -> &str {
        &self.config.provider
    }
}
