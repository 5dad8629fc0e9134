//! # cortex-retrieval
//!
//! The Retrieval path (§2, component 6 / §4.4): scoped vector search that
//! combines semantic distance with metadata filters and confidence
//! weighting. This crate holds no state of its own — it composes a
//! `VectorStore` search with a `RelationalStore` lookup so the caller gets
//! back full `Memory` records, not bare vector ids.

use cortex_core::constants::{DEFAULT_CONFIDENCE_WEIGHT, MAX_RETRIEVAL_LIMIT};
use cortex_core::errors::RetrievalError;
use cortex_core::memory::Memory;
use cortex_core::scope::Scope;
use cortex_core::traits::{RelationalStore, VectorSearchFilter, VectorStore};
use cortex_core::CortexResult;
use tracing::{debug, warn};

/// Parameters for one scoped retrieval call. `scope` is mandatory, mirroring
/// the relational gateway's rule that no listing or search is ever
/// unscoped.
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    pub scope: Scope,
    pub embedding: Vec<f32>,
    pub limit: usize,
    pub min_confidence: Option<f64>,
    pub topic: Option<String>,
    pub score_threshold: Option<f64>,
    /// Weight in `[0.0, 1.0]` given to stored confidence when blending it
    /// with vector similarity. Defaults to
    /// [`DEFAULT_CONFIDENCE_WEIGHT`].
    pub confidence_weight: f64,
}

impl RetrievalQuery {
    pub fn new(scope: Scope, embedding: Vec<f32>, limit: usize) -> Self {
        Self {
            scope,
            embedding,
            limit,
            min_confidence: None,
            topic: None,
            score_threshold: None,
            confidence_weight: DEFAULT_CONFIDENCE_WEIGHT,
        }
    }
}

/// One retrieval result: the full memory plus the scores that produced its
/// rank, so a caller can explain why it was returned.
#[derive(Debug, Clone)]
pub struct RetrievalHit {
    pub memory: Memory,
    pub vector_score: f64,
    pub weighted_score: f64,
}

/// Run a scoped retrieval: vector search restricted to `query.scope`,
/// hydrated against the relational store, re-ranked by a confidence-weighted
/// blend of similarity and stored confidence.
///
/// Memories the vector store returns but that are no longer active
/// (soft-deleted or expired since the last vector reconciliation) are
/// dropped rather than surfaced — the vector tier is only eventually
/// consistent with the relational tier (§5), and the relational record is
/// authoritative for whether a memory still exists.
pub async fn retrieve(
    vector: &dyn VectorStore,
    storage: &dyn RelationalStore,
    query: &RetrievalQuery,
) -> CortexResult<Vec<RetrievalHit>> {
    if query.limit == 0 || query.limit > MAX_RETRIEVAL_LIMIT {
        return Err(RetrievalError::InvalidLimit {
            limit: query.limit,
            max: MAX_RETRIEVAL_LIMIT,
        }
        .into());
    }

    let filter = VectorSearchFilter {
        scope: Some(query.scope.clone()),
        min_confidence: query.min_confidence,
        score_threshold: query.score_threshold,
    };

    let hits = vector
        .search(&query.embedding, query.limit, &filter)
        .await
        .map_err(|e| RetrievalError::SearchFailed { reason: e.to_string() })?;

    debug!(scope = ?query.scope, hits = hits.len(), "vector search returned hits");

    let now = chrono::Utc::now();
    let weight = query.confidence_weight.clamp(0.0, 1.0);
    let mut results = Vec::with_capacity(hits.len());

    for hit in hits {
        let memory = match storage.get_memory(hit.memory_id).await? {
            Some(m) => m,
            None => {
                warn!(memory_id = %hit.memory_id, "vector hit has no matching relational record");
                continue;
            }
        };

        if memory.scope != query.scope {
            warn!(memory_id = %hit.memory_id, "vector hit scope does not match query scope, dropped");
            continue;
        }

        if !memory.is_active(now) {
            continue;
        }

        if let Some(topic) = &query.topic {
            if memory.topic.as_deref() != Some(topic.as_str()) {
                continue;
            }
        }

        let weighted_score = (1.0 - weight) * hit.score + weight * memory.confidence.value();
        results.push(RetrievalHit {
            memory,
            vector_score: hit.score,
            weighted_score,
        });
    }

    results.sort_by(|a, b| {
        b.weighted_score
            .partial_cmp(&a.weighted_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cortex_core::memory::{Category, SourceType};
    use cortex_core::traits::VectorPoint;
    use cortex_storage::SqliteStore;
    use cortex_vector::InMemoryVectorStore;
    use uuid::Uuid;

    fn memory(scope: Scope, fact: &str, confidence: f64) -> Memory {
        let now = Utc::now();
        Memory {
            id: Uuid::new_v4(),
            scope,
            fact: fact.to_string(),
            topic: None,
            category: Category::Fact,
            confidence: confidence.into(),
            importance: 0.5.into(),
            source_type: SourceType::Extracted,
            source_session_id: None,
            source_memory_ids: Vec::new(),
            embedding: Some(vec![1.0, 0.0, 0.0]),
            embedding_model_id: Some("test".to_string()),
            revision_count: 1,
            created_at: now,
            updated_at: now,
            expires_at: None,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn rejects_zero_limit() {
        let vector = InMemoryVectorStore::new(3);
        let storage = SqliteStore::open_in_memory().unwrap();
        let query = RetrievalQuery::new(Scope::for_user("u1"), vec![1.0, 0.0, 0.0], 0);
        let err = retrieve(&vector, &storage, &query).await.unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[tokio::test]
    async fn returns_only_matching_scope_and_ranks_by_weighted_score() {
        let vector = InMemoryVectorStore::new(3);
        let storage = SqliteStore::open_in_memory().unwrap();

        let scope = Scope::for_user("u1");
        let other_scope = Scope::for_user("u2");

        let high_conf = memory(scope.clone(), "User prefers tea", 0.95);
        let low_conf = memory(scope.clone(), "User maybe likes tea", 0.3);
        let other = memory(other_scope.clone(), "User prefers coffee", 0.99);

        for m in [&high_conf, &low_conf, &other] {
            storage.create_memory(m).await.unwrap();
            vector
                .upsert_points(&[VectorPoint {
                    memory_id: m.id,
                    vector: vec![1.0, 0.0, 0.0],
                    scope: m.scope.clone(),
                    confidence: m.confidence.value(),
                    topic: m.topic.clone(),
                }])
                .await
                .unwrap();
        }

        let query = RetrievalQuery::new(scope.clone(), vec![1.0, 0.0, 0.0], 10);
        let hits = retrieve(&vector, &storage, &query).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.memory.scope == scope));
        assert_eq!(hits[0].memory.id, high_conf.id);
    }

    #[tokio::test]
    async fn soft_deleted_memory_is_excluded() {
        let vector = InMemoryVectorStore::new(3);
        let storage = SqliteStore::open_in_memory().unwrap();
        let scope = Scope::for_user("u1");

        let m = memory(scope.clone(), "User prefers tea", 0.9);
        storage.create_memory(&m).await.unwrap();
        vector
            .upsert_points(&[VectorPoint {
                memory_id: m.id,
                vector: vec![1.0, 0.0, 0.0],
                scope: scope.clone(),
                confidence: m.confidence.value(),
                topic: None,
            }])
            .await
            .unwrap();
        storage.delete_memory(m.id, None).await.unwrap();

        let query = RetrievalQuery::new(scope, vec![1.0, 0.0, 0.0], 10);
        let hits = retrieve(&vector, &storage, &query).await.unwrap();
        assert!(hits.is_empty());
    }
}
