//! §8 property: for every memory, the revision numbers returned by
//! `list_revisions` are a contiguous prefix of the positive integers
//! starting at 1, no matter how many updates (or the final delete) it
//! goes through.

use chrono::Utc;
use cortex_core::memory::confidence::{Confidence, Importance};
use cortex_core::memory::{Category, Memory, RevisionAction, SourceType};
use cortex_core::scope::Scope;
use cortex_core::traits::RelationalStore;
use cortex_storage::SqliteStore;
use proptest::prelude::*;
use uuid::Uuid;

fn genesis(fact: &str) -> Memory {
    let now = Utc::now();
    Memory {
        id: Uuid::new_v4(),
        scope: Scope::for_user("u1"),
        fact: fact.to_string(),
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
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn revision_numbers_stay_a_gapless_prefix_across_updates_and_delete(
        edits in prop::collection::vec("[a-z ]{3,12}", 0..12),
        ends_in_delete in any::<bool>(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let storage = SqliteStore::open_in_memory().unwrap();
            let mut memory = genesis("initial fact");
            storage.create_memory(&memory).await.unwrap();

            for edit in &edits {
                memory.fact = edit.clone();
                memory.updated_at = Utc::now();
                let expected = memory.revision_count;
                let revision = storage
                    .update_memory(&memory, RevisionAction::Updated, Some(expected))
                    .await
                    .unwrap();
                memory.revision_count = revision.revision_number;
            }

            if ends_in_delete {
                storage
                    .delete_memory(memory.id, Some(memory.revision_count))
                    .await
                    .unwrap();
            }

            let revisions = storage.list_revisions(memory.id).await.unwrap();
            let numbers: Vec<u64> = revisions.iter().map(|r| r.revision_number).collect();
            let expected_len = 1 + edits.len() + if ends_in_delete { 1 } else { 0 };

            prop_assert_eq!(numbers.len(), expected_len);
            for (idx, &n) in numbers.iter().enumerate() {
                prop_assert_eq!(n, (idx + 1) as u64);
            }
        });
    }
}
