//! # cortex-storage
//!
//! Relational Store Gateway: SQLite persistence for memories, revisions, and
//! jobs, behind the `RelationalStore` trait from `cortex-core`. Every write
//! that touches a memory also appends a revision in the same transaction, so
//! `revision_count` and the revision chain can never drift apart.

pub mod migrations;
pub mod pool;
pub mod queries;

use std::path::Path;

use async_trait::async_trait;
use uuid::Uuid;

use cortex_core::errors::{CortexError, CortexResult, StorageError};
use cortex_core::job::Job;
use cortex_core::memory::{Memory, MemoryRevision, RevisionAction};
use cortex_core::scope::Scope;
use cortex_core::traits::{MemoryFilter, RelationalStore};

use pool::ConnectionPool;

pub(crate) fn to_storage_err(message: impl Into<String>) -> CortexError {
    CortexError::StorageError(StorageError::SqliteError {
        message: message.into(),
    })
}

/// SQLite-backed `RelationalStore`. A single guarded connection in WAL mode;
/// see `pool::ConnectionPool` for why that's sufficient for this workload.
pub struct SqliteStore {
    pool: ConnectionPool,
}

impl SqliteStore {
    pub fn open(path: &Path) -> CortexResult<Self> {
        let pool = ConnectionPool::open(path)?;
        pool.with_conn(|conn| migrations::apply_all(conn))?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> CortexResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        pool.with_conn(|conn| migrations::apply_all(conn))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RelationalStore for SqliteStore {
    async fn create_memory(&self, memory: &Memory) -> CortexResult<()> {
        memory.validate_consolidated_sources()?;
        self.pool
            .with_conn_mut(|conn| queries::memory_crud::insert_memory_with_genesis_revision(conn, memory))
    }

    async fn get_memory(&self, id: Uuid) -> CortexResult<Option<Memory>> {
        self.pool
            .with_conn(|conn| queries::memory_crud::get_memory(conn, id))
    }

    async fn list_memories(&self, scope: &Scope, filter: &MemoryFilter) -> CortexResult<Vec<Memory>> {
        self.pool
            .with_conn(|conn| queries::memory_crud::list_memories(conn, scope, filter))
    }

    async fn update_memory(
        &self,
        memory: &Memory,
        action: RevisionAction,
        expected_revision_count: Option<u64>,
    ) -> CortexResult<MemoryRevision> {
        self.pool.with_conn_mut(|conn| {
            let previous = queries::memory_crud::get_memory(conn, memory.id)?;
            let previous_fact = previous.map(|m| m.fact);
            queries::memory_crud::update_memory_with_revision(
                conn,
                memory,
                action,
                expected_revision_count,
                previous_fact,
            )
        })
    }

    async fn delete_memory(&self, id: Uuid, expected_revision_count: Option<u64>) -> CortexResult<()> {
        self.pool
            .with_conn_mut(|conn| queries::memory_crud::soft_delete_memory(conn, id, expected_revision_count))
    }

    async fn list_revisions(&self, memory_id: Uuid) -> CortexResult<Vec<MemoryRevision>> {
        self.pool
            .with_conn(|conn| queries::memory_crud::list_revisions(conn, memory_id))
    }

    async fn create_job(&self, job: &Job) -> CortexResult<()> {
        self.pool.with_conn(|conn| queries::job_crud::insert_job(conn, job))
    }

    async fn get_job(&self, id: Uuid) -> CortexResult<Option<Job>> {
        self.pool.with_conn(|conn| queries::job_crud::get_job(conn, id))
    }

    async fn update_job(&self, job: &Job) -> CortexResult<()> {
        self.pool.with_conn(|conn| queries::job_crud::update_job(conn, job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::memory::{Category, SourceType};
    use cortex_core::memory::confidence::{Confidence, Importance};
    use chrono::Utc;

    fn sample_memory(scope: Scope) -> Memory {
        let now = Utc::now();
        Memory {
            id: Uuid::new_v4(),
            scope,
            fact: "lives in Seattle".to_string(),
            topic: Some("location".to_string()),
            category: Category::Location,
            confidence: Confidence::new(0.9),
            importance: Importance::new(0.5),
            source_type: SourceType::Extracted,
            source_session_id: Some("sess-1".to_string()),
            source_memory_ids: Vec::new(),
            embedding: None,
            embedding_model_id: None,
            revision_count: 0,
            created_at: now,
            updated_at: now,
            expires_at: None,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn create_and_get_memory_round_trips() {
        let store = SqliteStore::open_in_memory().unwrap();
        let scope = Scope::for_user("u1");
        let memory = sample_memory(scope.clone());
        store.create_memory(&memory).await.unwrap();

        let fetched = store.get_memory(memory.id).await.unwrap().unwrap();
        assert_eq!(fetched.fact, memory.fact);
        assert_eq!(fetched.scope, scope);
    }

    #[tokio::test]
    async fn create_memory_writes_a_genesis_revision() {
        let store = SqliteStore::open_in_memory().unwrap();
        let memory = sample_memory(Scope::for_user("u1"));
        store.create_memory(&memory).await.unwrap();

        let fetched = store.get_memory(memory.id).await.unwrap().unwrap();
        assert_eq!(fetched.revision_count, 1);

        let revisions = store.list_revisions(memory.id).await.unwrap();
        assert_eq!(revisions.len(), 1);
        assert!(revisions[0].is_genesis());
    }

    #[tokio::test]
    async fn update_memory_appends_revision_and_increments_count() {
        let store = SqliteStore::open_in_memory().unwrap();
        let memory = sample_memory(Scope::for_user("u1"));
        store.create_memory(&memory).await.unwrap();

        let mut updated = memory.clone();
        updated.fact = "lives in Portland now".to_string();
        let revision = store
            .update_memory(&updated, RevisionAction::Updated, Some(1))
            .await
            .unwrap();
        assert_eq!(revision.revision_number, 2);

        let fetched = store.get_memory(memory.id).await.unwrap().unwrap();
        assert_eq!(fetched.fact, "lives in Portland now");
        assert_eq!(fetched.revision_count, 2);
    }

    #[tokio::test]
    async fn concurrent_modification_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let memory = sample_memory(Scope::for_user("u1"));
        store.create_memory(&memory).await.unwrap();

        let result = store
            .update_memory(&memory, RevisionAction::Updated, Some(7))
            .await;
        assert!(matches!(
            result,
            Err(CortexError::StorageError(StorageError::ConcurrentModification { .. }))
        ));
    }

    #[tokio::test]
    async fn soft_delete_hides_memory_from_scoped_listing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let scope = Scope::for_user("u1");
        let memory = sample_memory(scope.clone());
        store.create_memory(&memory).await.unwrap();

        store.delete_memory(memory.id, Some(1)).await.unwrap();

        let listed = store
            .list_memories(&scope, &MemoryFilter::default())
            .await
            .unwrap();
        assert!(listed.is_empty());

        let revisions = store.list_revisions(memory.id).await.unwrap();
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[1].action, RevisionAction::Deleted);
    }

    #[tokio::test]
    async fn scope_isolation_holds_for_listing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let scope_a = Scope::for_user("u1");
        let scope_b = Scope::for_user("u2");
        store.create_memory(&sample_memory(scope_a.clone())).await.unwrap();
        store.create_memory(&sample_memory(scope_b.clone())).await.unwrap();

        let listed_b = store
            .list_memories(&scope_b, &MemoryFilter::default())
            .await
            .unwrap();
        assert_eq!(listed_b.len(), 1);
        assert_eq!(listed_b[0].scope, scope_b);
    }

    #[tokio::test]
    async fn job_lifecycle_round_trips() {
        use cortex_core::job::{ExtractPayload, JobPayload};

        let store = SqliteStore::open_in_memory().unwrap();
        let mut job = Job::new(
            Scope::for_user("u1"),
            JobPayload::Extract(ExtractPayload {
                session_id: "sess-1".to_string(),
            }),
        );
        store.create_job(&job).await.unwrap();

        job.mark_running();
        store.update_job(&job).await.unwrap();

        let fetched = store.get_job(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, job.status);
        assert_eq!(fetched.attempt_count, 1);
    }
}
