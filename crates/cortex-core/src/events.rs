//! Read-only event shape consumed from the external Sessions service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAuthor {
    User,
    Agent,
    Tool,
    System,
}

/// A single turn in an agent session, as returned by the Sessions service.
///
/// The core treats these as a read-only, chronologically ordered sequence;
/// it never mutates or persists them directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEvent {
    pub author: EventAuthor,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub invocation_id: Option<String>,
}

impl ConversationEvent {
    /// Render as a `speaker: content` line for prompt assembly.
    pub fn as_prompt_line(&self) -> String {
        let speaker = match self.author {
            EventAuthor::User => "user",
            EventAuthor::Agent => "agent",
            EventAuthor::Tool => "tool",
            EventAuthor::System => "system",
        };
        format!("{speaker}: {}", self.content)
    }
}
