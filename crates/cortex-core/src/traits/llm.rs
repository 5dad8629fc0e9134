use async_trait::async_trait;

use crate::errors::CortexResult;

/// One extraction attempt's raw outcome before parsing/validation.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub raw_text: String,
}

/// Uniform chat-completion provider with JSON-schema-constrained output.
/// Implementations classify their own errors into `LlmError::Transient` /
/// `LlmError::Permanent` and retry transient failures internally before
/// returning.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request a structured completion. `response_schema` is a JSON Schema
    /// document describing the expected output shape.
    async fn extract_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        response_schema: &serde_json::Value,
    ) -> CortexResult<LlmResponse>;

    fn name(&self) -> &str;
}
