use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EMBEDDING_BATCH_SIZE, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MAX_INPUT_TOKENS,
};

/// Embedding Adapter configuration. `EMBEDDING_` env var prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Output vector dimension. Valid range 256-3072.
    pub dimensions: usize,
    /// Batch size per adapter call. Valid range 1-2048.
    pub batch_size: usize,
    pub max_input_tokens: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key: String::new(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
            max_input_tokens: DEFAULT_EMBEDDING_MAX_INPUT_TOKENS,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(256..=3072).contains(&self.dimensions) {
            return Err(format!(
                "embedding_dimensions {} outside valid range 256-3072",
                self.dimensions
            ));
        }
        if !(1..=2048).contains(&self.batch_size) {
            return Err(format!(
                "embedding_batch_size {} outside valid range 1-2048",
                self.batch_size
            ));
        }
        Ok(())
    }
}
