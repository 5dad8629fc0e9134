use async_trait::async_trait;
use cortex_core::traits::{LlmProvider, LlmResponse};
use cortex_core::CortexResult;

/// Deterministic provider for tests: returns a fixed JSON body regardless of
/// the prompt, so extraction-stage tests don't depend on network access.
pub struct MockLlmProvider {
    pub response: String,
}

impl MockLlmProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }

    /// A canned response with a single plausible extraction candidate.
    pub fn single_fact(fact: &str, category: &str, confidence: f64) -> Self {
        Self::new(format!(
            r#"{{"facts":[{{"fact":"{fact}","category":"{category}","confidence":{confidence}}}]}}"#
        ))
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn extract_structured(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _response_schema: &serde_json::Value,
    ) -> CortexResult<LlmResponse> {
        Ok(LlmResponse {
            raw_text: self.response.clone(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
