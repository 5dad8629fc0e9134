use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::confidence::Confidence;

/// What produced a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionAction {
    Created,
    Updated,
    Merged,
    Deleted,
    Rollback,
}

/// One entry in a memory's append-only revision chain.
///
/// `revision_number` is 1-indexed and monotonic per `memory_id`; the chain
/// must never have a gap, and no row is ever modified after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRevision {
    pub id: Uuid,
    pub memory_id: Uuid,
    pub revision_number: u64,
    pub fact: String,
    pub action: RevisionAction,
    pub source_session_id: Option<String>,
    pub source_memory_ids: Option<Vec<Uuid>>,
    pub previous_fact: Option<String>,
    pub confidence: Confidence,
    pub created_at: DateTime<Utc>,
}

impl MemoryRevision {
    /// A revision is the chain's first iff it carries revision_number 1 and
    /// action CREATED; the two facts are proven equivalent by the storage
    /// layer's insertion invariant, so checking either alone would do, but
    /// checking both here catches a corrupted row early.
    pub fn is_genesis(&self) -> bool {
        self.revision_number == 1 && self.action == RevisionAction::Created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(revision_number: u64, action: RevisionAction) -> MemoryRevision {
        MemoryRevision {
            id: Uuid::new_v4(),
            memory_id: Uuid::new_v4(),
            revision_number,
            fact: "some fact".to_string(),
            action,
            source_session_id: None,
            source_memory_ids: None,
            previous_fact: None,
            confidence: Confidence::new(0.8),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn genesis_revision_is_number_one_and_created() {
        assert!(sample(1, RevisionAction::Created).is_genesis());
    }

    #[test]
    fn non_first_revision_is_not_genesis() {
        assert!(!sample(2, RevisionAction::Updated).is_genesis());
    }

    #[test]
    fn first_number_with_wrong_action_is_not_genesis() {
        assert!(!sample(1, RevisionAction::Updated).is_genesis());
    }
}
