//! An in-process [`SessionsClient`] double that serves a fixed event list
//! regardless of `session_id`, for tests that don't care about pagination.

use std::sync::Mutex;

use async_trait::async_trait;
use cortex_core::errors::CortexResult;
use cortex_core::events::ConversationEvent;
use cortex_core::traits::SessionsClient;

pub struct FakeSessionsClient {
    events: Mutex<Vec<ConversationEvent>>,
}

impl FakeSessionsClient {
    pub fn new(events: Vec<ConversationEvent>) -> Self {
        Self { events: Mutex::new(events) }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl SessionsClient for FakeSessionsClient {
    async fn list_events(&self, _session_id: &str, limit: usize) -> CortexResult<Vec<ConversationEvent>> {
        let events = self.events.lock().unwrap();
        Ok(events.iter().take(limit).cloned().collect())
    }
}
