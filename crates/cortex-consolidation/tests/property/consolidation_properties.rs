use chrono::Utc;
use cortex_consolidation::{consolidate, cosine_similarity};
use cortex_core::config::ConsolidationConfig;
use cortex_core::memory::confidence::{Confidence, Importance};
use cortex_core::memory::{Category, Memory, SourceType};
use cortex_core::scope::Scope;
use proptest::prelude::*;
use uuid::Uuid;

fn memory_with(fact: &str, confidence: f64, embedding: Vec<f32>) -> Memory {
    let now = Utc::now();
    Memory {
        id: Uuid::new_v4(),
        scope: Scope::for_user("u1"),
        fact: fact.to_string(),
        topic: None,
        category: Category::Fact,
        confidence: Confidence::new(confidence),
        importance: Importance::new(0.5),
        source_type: SourceType::Extracted,
        source_session_id: None,
        source_memory_ids: Vec::new(),
        embedding: Some(embedding),
        embedding_model_id: Some("test-model".to_string()),
        revision_count: 1,
        created_at: now,
        updated_at: now,
        expires_at: None,
        deleted_at: None,
    }
}

proptest! {
    #[test]
    fn merge_count_is_order_independent(
        facts in prop::collection::vec("[a-z ]{5,20}", 2..6),
        x in prop::collection::vec(0.0f32..1.0f32, 2..6),
    ) {
        let n = facts.len().min(x.len());
        let forward: Vec<Memory> = (0..n)
            .map(|i| memory_with(&facts[i], 0.8, vec![x[i], 1.0 - x[i]]))
            .collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let config = ConsolidationConfig::default();
        let a = consolidate(&forward, true, &config).unwrap();
        let b = consolidate(&reversed, true, &config).unwrap();

        prop_assert_eq!(a.merged.len(), b.merged.len());
        prop_assert_eq!(a.processed, b.processed);
    }

    #[test]
    fn every_merged_member_appears_in_exactly_one_component(
        x in prop::collection::vec(0.0f32..1.0f32, 2..8),
    ) {
        let memories: Vec<Memory> = x
            .iter()
            .enumerate()
            .map(|(i, v)| memory_with(&format!("fact number {i}"), 0.8, vec![*v, 1.0 - *v]))
            .collect();

        let config = ConsolidationConfig::default();
        let result = consolidate(&memories, true, &config).unwrap();

        let mut seen = std::collections::HashSet::new();
        for m in &result.merged {
            for id in &m.source_memory_ids {
                prop_assert!(seen.insert(*id), "memory {} appears in more than one merged component", id);
            }
        }
    }

    #[test]
    fn merge_boost_never_exceeds_one(
        x in prop::collection::vec(0.0f32..1.0f32, 2..6),
        confidences in prop::collection::vec(0.80f64..1.0f64, 2..6),
    ) {
        let n = x.len().min(confidences.len());
        let memories: Vec<Memory> = (0..n)
            .map(|i| memory_with("the same fact", confidences[i], vec![x[i], 1.0 - x[i]]))
            .collect();

        let config = ConsolidationConfig::default();
        let result = consolidate(&memories, true, &config).unwrap();
        for m in &result.merged {
            prop_assert!(m.confidence <= 1.0);
        }
    }

    /// Builds `cluster_sizes.len()` clusters of mutually-identical, pairwise-orthogonal
    /// one-hot embeddings, so every within-cluster pair sits at similarity 1.0 (well
    /// above `merge_threshold`) and every cross-cluster pair sits at 0.0 (well below
    /// `conflict_threshold`) by construction — no transitive chain through an
    /// intermediate pair can blur a cluster boundary. That lets the closure property
    /// (§8) be checked against the real `cosine_similarity` output instead of assumed.
    #[test]
    fn merge_closure_respects_the_conflict_and_merge_thresholds(
        cluster_sizes in prop::collection::vec(2usize..4, 2..5),
    ) {
        let dims = cluster_sizes.len();
        let mut memories: Vec<Memory> = Vec::new();
        let mut cluster_of: std::collections::HashMap<Uuid, usize> = std::collections::HashMap::new();

        for (cluster_idx, &size) in cluster_sizes.iter().enumerate() {
            let mut one_hot = vec![0.0f32; dims];
            one_hot[cluster_idx] = 1.0;
            for member in 0..size {
                let m = memory_with(&format!("cluster {cluster_idx} member {member}"), 0.8, one_hot.clone());
                cluster_of.insert(m.id, cluster_idx);
                memories.push(m);
            }
        }

        let config = ConsolidationConfig::default();
        let result = consolidate(&memories, true, &config).unwrap();

        let mut grouped: std::collections::HashSet<Uuid> = std::collections::HashSet::new();
        for m in &result.merged {
            for id in &m.source_memory_ids {
                grouped.insert(*id);
            }
        }

        let mut groups: Vec<Vec<Uuid>> = result.merged.iter().map(|m| m.source_memory_ids.clone()).collect();
        for memory in &memories {
            if !grouped.contains(&memory.id) {
                groups.push(vec![memory.id]);
            }
        }

        let by_id: std::collections::HashMap<Uuid, &Memory> = memories.iter().map(|m| (m.id, m)).collect();

        for group in &groups {
            for i in 0..group.len() {
                for j in (i + 1)..group.len() {
                    let a = by_id[&group[i]];
                    let b = by_id[&group[j]];
                    let sim = cosine_similarity(a.embedding.as_ref().unwrap(), b.embedding.as_ref().unwrap());
                    prop_assert!(sim >= config.conflict_threshold, "merged pair fell below the conflict threshold");
                }
            }
        }

        for gi in 0..groups.len() {
            for gj in (gi + 1)..groups.len() {
                for &id_a in &groups[gi] {
                    for &id_b in &groups[gj] {
                        let a = by_id[&id_a];
                        let b = by_id[&id_b];
                        let sim = cosine_similarity(a.embedding.as_ref().unwrap(), b.embedding.as_ref().unwrap());
                        prop_assert!(sim < config.merge_threshold, "distinct components share a mergeable pair");
                    }
                }
            }
        }
    }
}
