//! # cortex-sessions
//!
//! Narrow HTTP client for the external Sessions service — the only required
//! shape per §6 is a paginated, chronological `GET
//! …/events?session_id=…&limit=… → { events: [...] }`. Every other
//! Sessions-service endpoint is out of scope for the core.

use async_trait::async_trait;
use cortex_core::config::SessionsConfig;
use cortex_core::errors::CortexError;
use cortex_core::events::ConversationEvent;
use cortex_core::traits::SessionsClient;
use cortex_core::CortexResult;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct EventsResponse {
    events: Vec<ConversationEvent>,
}

/// `reqwest`-backed `SessionsClient`. Out-of-scope endpoints (session
/// create/update/delete, auth) deliberately have no method here.
pub struct HttpSessionsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionsClient {
    pub fn new(config: &SessionsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl SessionsClient for HttpSessionsClient {
    async fn list_events(&self, session_id: &str, limit: usize) -> CortexResult<Vec<ConversationEvent>> {
        let response = self
            .client
            .get(format!("{}/events", self.base_url))
            .query(&[("session_id", session_id), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(|e| CortexError::InvalidInput {
                reason: format!("sessions service request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(CortexError::InvalidInput {
                reason: format!("sessions service returned {}", response.status()),
            });
        }

        let body: EventsResponse = response.json().await.map_err(|e| CortexError::InvalidInput {
            reason: format!("sessions service returned an undecodable body: {e}"),
        })?;

        Ok(body.events)
    }
}
