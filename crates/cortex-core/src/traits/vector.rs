use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CortexResult;
use crate::scope::Scope;

/// A point upserted into the vector store: a memory's embedding plus the
/// minimal payload projection needed for post-retrieval filtering.
#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub memory_id: Uuid,
    pub vector: Vec<f32>,
    pub scope: Scope,
    pub confidence: f64,
    pub topic: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VectorSearchHit {
    pub memory_id: Uuid,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct VectorSearchFilter {
    pub scope: Option<Scope>,
    pub min_confidence: Option<f64>,
    pub score_threshold: Option<f64>,
}

/// Vector Store Gateway over a single scope-agnostic `memories` collection
/// with cosine distance.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Idempotent: a second call with the same name/dimension is a no-op.
    async fn create_collection(&self, name: &str, dimensions: usize) -> CortexResult<()>;

    async fn upsert_points(&self, points: &[VectorPoint]) -> CortexResult<()>;

    /// Rejects a query whose dimension differs from the collection's.
    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: &VectorSearchFilter,
    ) -> CortexResult<Vec<VectorSearchHit>>;

    async fn get_point(&self, memory_id: Uuid) -> CortexResult<Option<VectorPoint>>;

    async fn delete_points(&self, memory_ids: &[Uuid]) -> CortexResult<()>;

    async fn count(&self) -> CortexResult<u64>;

    async fn health(&self) -> CortexResult<bool>;
}
