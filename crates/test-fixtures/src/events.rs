//! Conversation event builders for extraction tests.

use chrono::Utc;
use cortex_core::events::{ConversationEvent, EventAuthor};

pub fn user_turn(content: impl Into<String>) -> ConversationEvent {
    turn(EventAuthor::User, content)
}

pub fn agent_turn(content: impl Into<String>) -> ConversationEvent {
    turn(EventAuthor::Agent, content)
}

pub fn turn(author: EventAuthor, content: impl Into<String>) -> ConversationEvent {
    ConversationEvent {
        author,
        content: content.into(),
        timestamp: Utc::now(),
        invocation_id: None,
    }
}

/// A short, realistic back-and-forth: one fact-bearing user turn followed by
/// an acknowledgement, the minimum shape extraction expects to act on.
pub fn exchange(user_content: impl Into<String>, agent_content: impl Into<String>) -> Vec<ConversationEvent> {
    vec![user_turn(user_content), agent_turn(agent_content)]
}
