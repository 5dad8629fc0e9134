use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use super::confidence::{Confidence, Importance};

/// A fact proposed by the Extraction Stage. Lives only between extraction
/// and consolidation; never persisted until the Coordinator accepts it as a
/// `Memory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    pub fact: String,
    pub category: Category,
    pub confidence: Confidence,
    pub topic: Option<String>,
    pub importance: Importance,
    /// Populated by the Embedding stage; `None` until then.
    pub embedding: Option<Vec<f32>>,
}

impl ExtractionCandidate {
    pub fn new(fact: String, category: Category, confidence: Confidence, importance: Importance) -> Self {
        Self {
            fact,
            category,
            confidence,
            topic: None,
            importance,
            embedding: None,
        }
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

/// A pair of existing memories flagged by Consolidation as related enough to
/// need a decision: merge, or record as a conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeCandidate {
    pub memory_a: Uuid,
    pub memory_b: Uuid,
    pub similarity: f64,
    pub is_conflict: bool,
}

impl MergeCandidate {
    pub fn new(memory_a: Uuid, memory_b: Uuid, similarity: f64, is_conflict: bool) -> Self {
        Self {
            memory_a,
            memory_b,
            similarity: similarity.clamp(0.0, 1.0),
            is_conflict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_candidate_has_no_embedding() {
        let c = ExtractionCandidate::new(
            "fact".to_string(),
            Category::Fact,
            Confidence::new(0.7),
            Importance::new(0.5),
        );
        assert!(!c.has_embedding());
    }

    #[test]
    fn merge_candidate_clamps_similarity() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mc = MergeCandidate::new(a, b, 1.2, false);
        assert_eq!(mc.similarity, 1.0);
    }
}
