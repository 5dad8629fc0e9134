use serde::{Deserialize, Serialize};

/// Relational Store Gateway configuration. `RELATIONAL_` env var prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file path or `:memory:`.
    pub relational_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            relational_url: "cortex.sqlite3".to_string(),
        }
    }
}
