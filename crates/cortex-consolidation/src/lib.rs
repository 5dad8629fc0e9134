//! # cortex-consolidation
//!
//! Consolidation Stage: pairwise cosine similarity over a batch of memories,
//! conflict/merge classification, connected-components merge graph, and
//! survivor selection. Pure with respect to storage — no I/O, the Coordinator
//! decides what gets written.

mod merge;
mod similarity;

pub use merge::MergedMemory;
pub use similarity::cosine_similarity;

use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::ConsolidationError;
use cortex_core::memory::candidate::MergeCandidate;
use cortex_core::memory::Memory;
use cortex_core::CortexResult;
use petgraph::unionfind::UnionFind;
use tracing::warn;

/// Output of one consolidation pass over a batch of memories.
#[derive(Debug, Clone, Default)]
pub struct ConsolidationResult {
    pub merged: Vec<MergedMemory>,
    pub conflicts: Vec<MergeCandidate>,
    pub processed: usize,
}

/// Run the Consolidation Stage over `memories`. `memories` is a uniform set —
/// the Coordinator is responsible for promoting `ExtractionCandidate`s to
/// provisional `Memory` rows before calling this.
pub fn consolidate(memories: &[Memory], detect_conflicts: bool, config: &ConsolidationConfig) -> CortexResult<ConsolidationResult> {
    let n = memories.len();

    if n > config.max_batch {
        return Err(ConsolidationError::BatchTooLarge {
            size: n,
            max: config.max_batch,
        }
        .into());
    }

    if n < 2 {
        return Ok(ConsolidationResult {
            processed: n,
            ..Default::default()
        });
    }

    let mut merge_edges: Vec<(usize, usize)> = Vec::new();
    let mut conflicts = Vec::new();

    for i in 0..n {
        if memories[i].embedding.is_none() {
            warn!(memory_id = %memories[i].id, "memory has no embedding, treated as similarity 0 with all peers");
        }
        for j in (i + 1)..n {
            let similarity = match (&memories[i].embedding, &memories[j].embedding) {
                (Some(a), Some(b)) => cosine_similarity(a, b),
                _ => 0.0,
            };

            let identical = similarity::facts_textually_identical(&memories[i].fact, &memories[j].fact);

            if identical {
                merge_edges.push((i, j));
                continue;
            }

            if similarity < config.conflict_threshold {
                continue;
            }

            if similarity >= config.merge_threshold {
                merge_edges.push((i, j));
            } else if detect_conflicts {
                conflicts.push(MergeCandidate::new(memories[i].id, memories[j].id, similarity, true));
            }
        }
    }

    let mut uf = UnionFind::new(n);
    for (i, j) in &merge_edges {
        uf.union(*i, *j);
    }

    let labeling = uf.into_labeling();
    let mut components: std::collections::HashMap<usize, Vec<usize>> = std::collections::HashMap::new();
    for (idx, root) in labeling.iter().enumerate() {
        components.entry(*root).or_default().push(idx);
    }

    let mut merged = Vec::new();
    for indices in components.values() {
        if indices.len() < 2 {
            continue;
        }
        let members: Vec<&Memory> = indices.iter().map(|&i| &memories[i]).collect();
        merged.push(merge::merge_component(&members, config.merge_strategy, config.confidence_boost));
    }

    // Deterministic output order: by lowest member id in the component.
    merged.sort_by(|a, b| a.source_memory_ids.iter().min().cmp(&b.source_memory_ids.iter().min()));

    Ok(ConsolidationResult {
        merged,
        conflicts,
        processed: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cortex_core::memory::{Category, SourceType};
    use cortex_core::memory::confidence::{Confidence, Importance};
    use cortex_core::scope::Scope;
    use uuid::Uuid;

    fn memory_with(fact: &str, confidence: f64, embedding: Option<Vec<f32>>) -> Memory {
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
            embedding,
            embedding_model_id: Some("test-model".to_string()),
            revision_count: 1,
            created_at: now,
            updated_at: now,
            expires_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn fewer_than_two_memories_returns_immediately() {
        let memories = vec![memory_with("alone", 0.9, Some(vec![1.0, 0.0]))];
        let result = consolidate(&memories, true, &ConsolidationConfig::default()).unwrap();
        assert!(result.merged.is_empty());
        assert_eq!(result.processed, 1);
    }

    #[test]
    fn batch_over_limit_is_rejected() {
        let memories: Vec<Memory> = (0..3).map(|i| memory_with(&format!("fact {i}"), 0.9, Some(vec![1.0, 0.0]))).collect();
        let mut config = ConsolidationConfig::default();
        config.max_batch = 2;
        assert!(consolidate(&memories, true, &config).is_err());
    }

    #[test]
    fn highly_similar_embeddings_merge() {
        let a = memory_with("likes coffee", 0.7, Some(vec![1.0, 0.0, 0.0]));
        let b = memory_with("likes dark roast coffee", 0.9, Some(vec![0.99, 0.01, 0.0]));
        let result = consolidate(&[a, b], true, &ConsolidationConfig::default()).unwrap();
        assert_eq!(result.merged.len(), 1);
        assert_eq!(result.merged[0].source_memory_ids.len(), 2);
    }

    #[test]
    fn mid_range_similarity_with_differing_facts_is_a_conflict() {
        let a = memory_with("likes coffee", 0.7, Some(vec![1.0, 0.0, 0.0]));
        let b = memory_with("dislikes coffee", 0.9, Some(vec![0.80, 0.60, 0.0]));
        let result = consolidate(&[a, b], true, &ConsolidationConfig::default()).unwrap();
        assert!(result.merged.is_empty());
        assert_eq!(result.conflicts.len(), 1);
    }

    #[test]
    fn conflicts_are_not_recorded_when_detection_disabled() {
        let a = memory_with("likes coffee", 0.7, Some(vec![1.0, 0.0, 0.0]));
        let b = memory_with("dislikes coffee", 0.9, Some(vec![0.80, 0.60, 0.0]));
        let result = consolidate(&[a, b], false, &ConsolidationConfig::default()).unwrap();
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn textually_identical_facts_always_merge_despite_low_similarity() {
        let a = memory_with("Lives in Seattle", 0.5, Some(vec![1.0, 0.0]));
        let b = memory_with("lives in seattle", 0.95, Some(vec![0.0, 1.0]));
        let result = consolidate(&[a, b], true, &ConsolidationConfig::default()).unwrap();
        assert_eq!(result.merged.len(), 1);
        assert!((result.merged[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn transitive_merges_form_one_component() {
        let a = memory_with("likes coffee", 0.6, Some(vec![1.0, 0.0, 0.0]));
        let b = memory_with("likes dark roast coffee", 0.7, Some(vec![0.99, 0.01, 0.0]));
        let c = memory_with("likes dark roast coffee daily", 0.8, Some(vec![0.98, 0.02, 0.0]));
        let unrelated = memory_with("works as a nurse", 0.9, Some(vec![0.0, 0.0, 1.0]));
        let result = consolidate(&[a, b, c, unrelated], true, &ConsolidationConfig::default()).unwrap();
        assert_eq!(result.merged.len(), 1);
        assert_eq!(result.merged[0].source_memory_ids.len(), 3);
    }

    #[test]
    fn missing_embedding_does_not_merge_and_warns_not_errors() {
        let a = memory_with("likes coffee", 0.6, None);
        let b = memory_with("likes coffee", 0.9, Some(vec![1.0, 0.0]));
        let result = consolidate(&[a, b], true, &ConsolidationConfig::default()).unwrap();
        // textually identical still forces a merge even with a missing embedding
        assert_eq!(result.merged.len(), 1);
    }

    #[test]
    fn unrelated_memories_with_embeddings_pass_through_unmerged() {
        let a = memory_with("likes coffee", 0.6, Some(vec![1.0, 0.0]));
        let b = memory_with("works as a nurse", 0.9, Some(vec![0.0, 1.0]));
        let result = consolidate(&[a, b], true, &ConsolidationConfig::default()).unwrap();
        assert!(result.merged.is_empty());
        assert!(result.conflicts.is_empty());
    }
}
