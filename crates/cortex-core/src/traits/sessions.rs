use async_trait::async_trait;

use crate::errors::CortexResult;
use crate::events::ConversationEvent;

/// Narrow read-only client for the external Sessions service.
#[async_trait]
pub trait SessionsClient: Send + Sync {
    /// Fetch a session's events, paginated and chronologically ordered.
    async fn list_events(&self, session_id: &str, limit: usize) -> CortexResult<Vec<ConversationEvent>>;
}
