use std::time::Duration;

use async_trait::async_trait;
use cortex_core::config::EmbeddingConfig;
use cortex_core::errors::{CortexError, EmbeddingError};
use cortex_core::traits::{EmbedResult, EmbeddingProvider};
use cortex_core::CortexResult;
use serde_json::json;

use crate::truncation::truncate_to_token_budget;

/// OpenAI-compatible embeddings endpoint client.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    config: EmbeddingConfig,
}

impl HttpEmbeddingProvider {
    pub fn new(config: EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
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

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let truncated: Vec<String> = inputs
            .iter()
            .map(|t| truncate_to_token_budget(t, self.config.max_input_tokens))
            .collect();

        let payload = json!({
            "model": self.config.model,
            "input": truncated,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmbeddingError::Transient {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(EmbeddingError::Transient {
                reason: format!("upstream returned {status}"),
            });
        }
        if status.is_client_error() {
            return Err(EmbeddingError::Permanent {
                reason: format!("upstream returned {status}"),
            });
        }

        let body: serde_json::Value =
            response.json().await.map_err(|e| EmbeddingError::Transient {
                reason: format!("failed to decode response body: {e}"),
            })?;

        let data = body
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| EmbeddingError::Permanent {
                reason: "response missing data array".to_string(),
            })?;

        data.iter()
            .map(|item| {
                item.get("embedding")
                    .and_then(|e| e.as_array())
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|v| v.as_f64())
                            .map(|v| v as f32)
                            .collect::<Vec<f32>>()
                    })
                    .ok_or_else(|| EmbeddingError::Permanent {
                        reason: "response item missing embedding array".to_string(),
                    })
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed_one(&self, text: &str) -> CortexResult<Vec<f32>> {
        let mut vectors = self
            .request(std::slice::from_ref(&text.to_string()))
            .await
            .map_err(|e| -> CortexError { e.into() })?;
        vectors.pop().ok_or_else(|| {
            CortexError::EmbeddingError(EmbeddingError::Permanent {
                reason: "provider returned no vector".to_string(),
            })
        })
    }

    async fn embed_many(&self, texts: &[String]) -> CortexResult<EmbedResult> {
        if texts.is_empty() {
            return Err(EmbeddingError::BatchFailed {
                batch_size: 0,
                reason: "empty batch".to_string(),
            }
            .into());
        }

        match self.request(texts).await {
            Ok(vectors) => {
                let expected = self.config.dimensions;
                for v in &vectors {
                    if v.len() != expected {
                        return Err(EmbeddingError::DimensionMismatch {
                            expected,
                            actual: v.len(),
                        }
                        .into());
                    }
                }
                Ok(EmbedResult {
                    vectors: vectors.into_iter().map(Some).collect(),
                    model_id: self.model_id().to_string(),
                    error: None,
                })
            }
            Err(e) => Ok(EmbedResult {
                vectors: vec![None; texts.len()],
                model_id: self.model_id().to_string(),
                error: Some(e.to_string()),
            }),
        }
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}
