use serde::{Deserialize, Serialize};

/// Vector Store Gateway configuration. `VECTOR_` env var prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    pub vector_url: String,
    /// Scope-agnostic collection name; payload filters scope per §6.
    pub collection_name: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            vector_url: "http://localhost:6334".to_string(),
            collection_name: "memories".to_string(),
        }
    }
}
