use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CortexResult;
use crate::job::Job;
use crate::memory::{Memory, MemoryRevision, RevisionAction};
use crate::scope::Scope;

/// Equality predicates over `Memory` fields, used by scoped listing.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilter {
    pub category: Option<crate::memory::Category>,
    pub min_confidence: Option<f64>,
    pub topic: Option<String>,
    pub include_deleted: bool,
}

/// Relational Store Gateway: durable CRUD over `memories`, `memory_revisions`,
/// and `jobs`, with gapless per-memory revisions and optimistic concurrency.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn create_memory(&self, memory: &Memory) -> CortexResult<()>;

    async fn get_memory(&self, id: Uuid) -> CortexResult<Option<Memory>>;

    /// `scope` is mandatory: every listing is scoped, never global.
    async fn list_memories(&self, scope: &Scope, filter: &MemoryFilter) -> CortexResult<Vec<Memory>>;

    /// Update `memory` and append a revision in one transaction, incrementing
    /// `revision_count`. If `expected_revision_count` is given and it doesn't
    /// match the stored value, fails with `CortexError::ConcurrentModification`.
    async fn update_memory(
        &self,
        memory: &Memory,
        action: RevisionAction,
        expected_revision_count: Option<u64>,
    ) -> CortexResult<MemoryRevision>;

    /// Soft delete: sets `deleted_at`, appends a `DELETED` revision, in one
    /// transaction.
    async fn delete_memory(&self, id: Uuid, expected_revision_count: Option<u64>) -> CortexResult<()>;

    async fn list_revisions(&self, memory_id: Uuid) -> CortexResult<Vec<MemoryRevision>>;

    async fn create_job(&self, job: &Job) -> CortexResult<()>;

    async fn get_job(&self, id: Uuid) -> CortexResult<Option<Job>>;

    async fn update_job(&self, job: &Job) -> CortexResult<()>;
}
