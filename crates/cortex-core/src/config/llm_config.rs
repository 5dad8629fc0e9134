use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};

/// LLM Adapter configuration. `LLM_` env var prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    /// Never serialized back out to a saved config file.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_s: u64,
    pub max_retries: u32,
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            timeout_s: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            temperature: 0.0,
        }
    }
}
