//! Builder for [`Memory`] values, defaulted to a valid, active, extracted
//! memory so a test only has to override the fields it cares about.

use chrono::Utc;
use cortex_core::{Category, Confidence, Importance, Memory, Scope, SourceType};
use uuid::Uuid;

pub struct MemoryBuilder {
    memory: Memory,
}

impl MemoryBuilder {
    pub fn new(scope: Scope, fact: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            memory: Memory {
                id: Uuid::new_v4(),
                scope,
                fact: fact.into(),
                topic: None,
                category: Category::Fact,
                confidence: Confidence::new(0.8),
                importance: Importance::new(0.5),
                source_type: SourceType::Extracted,
                source_session_id: None,
                source_memory_ids: Vec::new(),
                embedding: None,
                embedding_model_id: None,
                revision_count: 1,
                created_at: now,
                updated_at: now,
                expires_at: None,
                deleted_at: None,
            },
        }
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.memory.topic = Some(topic.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.memory.category = category;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.memory.confidence = Confidence::new(confidence);
        self
    }

    pub fn importance(mut self, importance: f64) -> Self {
        self.memory.importance = Importance::new(importance);
        self
    }

    pub fn embedding(mut self, vector: Vec<f32>, model_id: impl Into<String>) -> Self {
        self.memory.embedding = Some(vector);
        self.memory.embedding_model_id = Some(model_id.into());
        self
    }

    pub fn source_session(mut self, session_id: impl Into<String>) -> Self {
        self.memory.source_session_id = Some(session_id.into());
        self
    }

    pub fn consolidated_from(mut self, source_memory_ids: Vec<Uuid>) -> Self {
        self.memory.source_type = SourceType::Consolidated;
        self.memory.source_memory_ids = source_memory_ids;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.memory.deleted_at = Some(Utc::now());
        self
    }

    pub fn expired(mut self) -> Self {
        self.memory.expires_at = Some(Utc::now() - chrono::Duration::seconds(1));
        self
    }

    pub fn build(self) -> Memory {
        self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_an_active_extracted_memory() {
        let memory = MemoryBuilder::new(Scope::for_user("u1"), "likes tea").build();
        assert!(memory.is_active(Utc::now()));
        assert_eq!(memory.source_type, SourceType::Extracted);
    }

    #[test]
    fn consolidated_from_sets_sources_and_type() {
        let source = Uuid::new_v4();
        let memory = MemoryBuilder::new(Scope::for_user("u1"), "likes tea")
            .consolidated_from(vec![source])
            .build();
        assert_eq!(memory.source_type, SourceType::Consolidated);
        assert_eq!(memory.source_memory_ids, vec![source]);
    }
}
