mod consolidation_config;
mod embedding_config;
mod extraction_config;
mod llm_config;
mod queue_config;
mod sessions_config;
mod storage_config;
mod vector_config;

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use consolidation_config::{ConsolidationConfig, MergeStrategy};
pub use embedding_config::EmbeddingConfig;
pub use extraction_config::{ExtractionConfig, FewShotExample};
pub use llm_config::LlmConfig;
pub use queue_config::QueueConfig;
pub use sessions_config::SessionsConfig;
pub use storage_config::StorageConfig;
pub use vector_config::VectorConfig;

use crate::errors::{CortexError, CortexResult};

/// Root configuration object. Loaded from an optional TOML file, then
/// overridden field-by-field from the environment variables listed in each
/// subsystem's config struct.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CortexConfig {
    pub queue: QueueConfig,
    pub storage: StorageConfig,
    pub vector: VectorConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub extraction: ExtractionConfig,
    pub consolidation: ConsolidationConfig,
    pub sessions: SessionsConfig,
}

impl CortexConfig {
    /// Load a TOML config file if it exists, apply recognized environment
    /// variable overrides, then validate. Missing file is not an error — the
    /// defaults apply, same as `AppConfig::load_from` does in the agent CLI
    /// this pattern is modeled on.
    pub fn load_from(path: impl AsRef<Path>) -> CortexResult<Self> {
        let mut config = Self::default();
        let path = path.as_ref();
        if path.exists() {
            let raw = fs::read_to_string(path).map_err(|e| CortexError::InvalidInput {
                reason: format!("failed to read config file {}: {e}", path.display()),
            })?;
            config = toml::from_str(&raw).map_err(|e| CortexError::InvalidInput {
                reason: format!("failed to parse config file {}: {e}", path.display()),
            })?;
        }
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_string("QUEUE_URL") {
            self.queue.queue_url = v;
        }
        if let Some(v) = env_parse::<u16>("WORKER_PREFETCH") {
            self.queue.worker_prefetch = v;
        }
        if let Some(v) = env_parse::<usize>("WORKER_CONCURRENCY") {
            self.queue.worker_concurrency = v;
        }
        if let Some(v) = env_parse::<u64>("WORKER_DRAIN_TIMEOUT_S") {
            self.queue.worker_drain_timeout_s = v;
        }
        if let Some(v) = env_parse::<u32>("DEAD_LETTER_AFTER") {
            self.queue.dead_letter_after = v;
        }
        if let Some(v) = env_string("WORKER_NAME") {
            self.queue.worker_name = v;
        }

        if let Some(v) = env_string("RELATIONAL_URL") {
            self.storage.relational_url = v;
        }

        if let Some(v) = env_string("VECTOR_URL") {
            self.vector.vector_url = v;
        }

        if let Some(v) = env_string("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Some(v) = env_string("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = env_string("LLM_API_KEY") {
            self.llm.api_key = v;
        }
        if let Some(v) = env_parse::<u64>("LLM_TIMEOUT_S") {
            self.llm.timeout_s = v;
        }
        if let Some(v) = env_parse::<u32>("LLM_MAX_RETRIES") {
            self.llm.max_retries = v;
        }
        if let Some(v) = env_parse::<f64>("LLM_TEMPERATURE") {
            self.llm.temperature = v;
        }

        if let Some(v) = env_string("EMBEDDING_PROVIDER") {
            self.embedding.provider = v;
        }
        if let Some(v) = env_string("EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
        if let Some(v) = env_string("EMBEDDING_API_KEY") {
            self.embedding.api_key = v;
        }
        if let Some(v) = env_parse::<usize>("EMBEDDING_DIMENSIONS") {
            self.embedding.dimensions = v;
        }
        if let Some(v) = env_parse::<usize>("EMBEDDING_BATCH_SIZE") {
            self.embedding.batch_size = v;
        }
        if let Some(v) = env_parse::<usize>("EMBEDDING_MAX_INPUT_TOKENS") {
            self.embedding.max_input_tokens = v;
        }

        if let Some(v) = env_parse::<usize>("EXTRACTION_MIN_EVENTS") {
            self.extraction.min_events = v;
        }
        if let Some(v) = env_parse::<usize>("EXTRACTION_MAX_FACTS") {
            self.extraction.max_facts = v;
        }
        if let Some(v) = env_parse::<f64>("EXTRACTION_MIN_CONFIDENCE") {
            self.extraction.min_confidence = v;
        }

        if let Some(v) = env_parse::<f64>("CONSOLIDATION_MERGE_THRESHOLD") {
            self.consolidation.merge_threshold = v;
        }
        if let Some(v) = env_parse::<f64>("CONSOLIDATION_CONFLICT_THRESHOLD") {
            self.consolidation.conflict_threshold = v;
        }
        if let Some(v) = env::var("CONSOLIDATION_MERGE_STRATEGY").ok().and_then(|raw| {
            match raw.as_str() {
                "highest_confidence" => Some(MergeStrategy::HighestConfidence),
                "most_recent" => Some(MergeStrategy::MostRecent),
                "longest" => Some(MergeStrategy::Longest),
                _ => None,
            }
        }) {
            self.consolidation.merge_strategy = v;
        }
        if let Some(v) = env_parse::<f64>("CONSOLIDATION_CONFIDENCE_BOOST") {
            self.consolidation.confidence_boost = v;
        }
        if let Some(v) = env_parse::<usize>("CONSOLIDATION_MAX_BATCH") {
            self.consolidation.max_batch = v;
        }
        if let Some(v) = env_parse::<usize>("CONSOLIDATION_AUTO_TRIGGER_THRESHOLD") {
            self.consolidation.auto_consolidate_threshold = v;
        }

        if let Some(v) = env_string("SESSIONS_BASE_URL") {
            self.sessions.base_url = v;
        }
    }

    fn validate(&self) -> CortexResult<()> {
        self.embedding.validate().map_err(|reason| CortexError::InvalidInput { reason })?;
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = CortexConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = CortexConfig::load_from("/nonexistent/cortex.toml").unwrap();
        assert_eq!(config.vector.collection_name, "memories");
    }
}
