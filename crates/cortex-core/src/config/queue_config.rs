use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DEAD_LETTER_AFTER, DEFAULT_DRAIN_TIMEOUT_SECS, DEFAULT_WORKER_PREFETCH};

/// Queue fabric configuration. `QUEUE_`/`WORKER_` env var prefixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub queue_url: String,
    pub worker_prefetch: u16,
    /// Number of concurrent in-flight job handlers per process.
    pub worker_concurrency: usize,
    pub worker_drain_timeout_s: u64,
    pub dead_letter_after: u32,
    /// Logical worker name, used in log fields and as the consumer tag.
    pub worker_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_url: "amqp://127.0.0.1:5672/%2f".to_string(),
            worker_prefetch: DEFAULT_WORKER_PREFETCH,
            worker_concurrency: DEFAULT_WORKER_PREFETCH as usize,
            worker_drain_timeout_s: DEFAULT_DRAIN_TIMEOUT_SECS,
            dead_letter_after: DEFAULT_DEAD_LETTER_AFTER,
            worker_name: "cortex-worker".to_string(),
        }
    }
}
