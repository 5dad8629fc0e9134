use serde::{Deserialize, Serialize};

/// Sessions-service HTTP client configuration. `SESSIONS_` env var prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub base_url: String,
    /// Page size for the `events` list endpoint.
    pub page_limit: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            page_limit: 200,
        }
    }
}
