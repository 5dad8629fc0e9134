//! # cortex-coordinator
//!
//! The Memory Coordinator: the only component that writes a `Memory` or a
//! `MemoryRevision`. Every mutation — whether it originates from an
//! extraction job or a standalone consolidation sweep — goes through
//! [`Coordinator::run_extraction_job`] or [`Coordinator::run_consolidation_job`]
//! so that a revision always accompanies a change.

mod reconcile;

pub use reconcile::ReconcileOutcome;

use std::sync::Arc;

use cortex_core::config::{ConsolidationConfig, EmbeddingConfig, ExtractionConfig, SessionsConfig};
use cortex_core::errors::CoordinatorError;
use cortex_core::job::{ConsolidatePayload, ExtractPayload, Job, JobKind, JobPayload, JobResult, JobStatus};
use cortex_core::traits::{EmbeddingProvider, LlmProvider, MemoryFilter, RelationalStore, SessionsClient, VectorStore};
use cortex_core::CortexResult;
use tracing::{info, warn};

pub struct Coordinator {
    sessions: Arc<dyn SessionsClient>,
    llm: Arc<dyn LlmProvider>,
    embeddings: Arc<dyn EmbeddingProvider>,
    storage: Arc<dyn RelationalStore>,
    vector: Arc<dyn VectorStore>,
    extraction_config: ExtractionConfig,
    consolidation_config: ConsolidationConfig,
    sessions_config: SessionsConfig,
    embedding_config: EmbeddingConfig,
}

impl Coordinator {
    pub fn new(
        sessions: Arc<dyn SessionsClient>,
        llm: Arc<dyn LlmProvider>,
        embeddings: Arc<dyn EmbeddingProvider>,
        storage: Arc<dyn RelationalStore>,
        vector: Arc<dyn VectorStore>,
        extraction_config: ExtractionConfig,
        consolidation_config: ConsolidationConfig,
        sessions_config: SessionsConfig,
        embedding_config: EmbeddingConfig,
    ) -> Self {
        Self {
            sessions,
            llm,
            embeddings,
            storage,
            vector,
            extraction_config,
            consolidation_config,
            sessions_config,
            embedding_config,
        }
    }

    /// Run an `EXTRACT` job to completion, mutating `job` in place to
    /// `COMPLETED` or `FAILED`. Only returns `Err` when the job's own status
    /// couldn't be persisted — everything else (upstream PERMANENT failures,
    /// retry-budget exhaustion) is recorded on the job itself so the queue
    /// fabric can ack the message either way.
    pub async fn run_extraction_job(&self, job: &mut Job) -> CortexResult<Option<Job>> {
        if let Some(completed) = self.sync_job_row(job).await? {
            info!(job_id = %job.id, "replayed an already-completed extraction job, skipping re-execution");
            adopt_terminal_state(job, completed);
            return Ok(None);
        }

        let payload = match &job.payload {
            JobPayload::Extract(p) => p.clone(),
            _ => {
                job.mark_failed(
                    CoordinatorError::UnsupportedPayload {
                        id: job.id.to_string(),
                        kind: format!("{:?}", job.kind()),
                    }
                    .to_string(),
                );
                self.storage.update_job(job).await?;
                return Ok(None);
            }
        };

        job.mark_running();
        self.storage.update_job(job).await?;

        match self.try_run_extraction(job, &payload).await {
            Ok((result, follow_up)) => {
                job.mark_completed(result);
                self.storage.update_job(job).await?;
                Ok(follow_up)
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "extraction job failed");
                job.mark_failed(e.to_string());
                self.storage.update_job(job).await?;
                Ok(None)
            }
        }
    }

    /// Run a `CONSOLIDATE` job to completion. Same completion semantics as
    /// [`Coordinator::run_extraction_job`].
    pub async fn run_consolidation_job(&self, job: &mut Job) -> CortexResult<Option<Job>> {
        if let Some(completed) = self.sync_job_row(job).await? {
            info!(job_id = %job.id, "replayed an already-completed consolidation job, skipping re-execution");
            adopt_terminal_state(job, completed);
            return Ok(None);
        }

        let payload = match &job.payload {
            JobPayload::Consolidate(p) => p.clone(),
            _ => {
                job.mark_failed(
                    CoordinatorError::UnsupportedPayload {
                        id: job.id.to_string(),
                        kind: format!("{:?}", job.kind()),
                    }
                    .to_string(),
                );
                self.storage.update_job(job).await?;
                return Ok(None);
            }
        };

        job.mark_running();
        self.storage.update_job(job).await?;

        match self.try_run_consolidation(job, &payload).await {
            Ok(result) => {
                job.mark_completed(result);
                self.storage.update_job(job).await?;
                Ok(None)
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "consolidation job failed");
                job.mark_failed(e.to_string());
                self.storage.update_job(job).await?;
                Ok(None)
            }
        }
    }

    async fn try_run_extraction(&self, job: &Job, payload: &ExtractPayload) -> CortexResult<(JobResult, Option<Job>)> {
        // Step 1: load context.
        let events = self
            .sessions
            .list_events(&payload.session_id, self.sessions_config.page_limit)
            .await?;

        if events.is_empty() {
            info!(job_id = %job.id, "no events for session, completing with zero memories");
            return Ok((JobResult::default(), None));
        }

        // Step 2: extract.
        let extraction = cortex_extraction::extract(self.llm.as_ref(), &events, &self.extraction_config).await?;
        if extraction.candidates.is_empty() {
            info!(job_id = %job.id, ?extraction.empty_reason, "extraction produced no candidates");
            return Ok((JobResult::default(), None));
        }

        // Step 3: embed candidates (batched, retry-then-skip on sub-batch failure).
        let texts: Vec<String> = extraction.candidates.iter().map(|c| c.fact.clone()).collect();
        let embed_results = cortex_embeddings::embed_batched(self.embeddings.as_ref(), &texts, self.embedding_config.batch_size).await?;
        let vectors: Vec<Option<Vec<f32>>> = embed_results.into_iter().flat_map(|r| r.vectors).collect();

        let mut candidates_memories = Vec::new();
        let mut embeddings_ok = 0usize;
        for (candidate, vector) in extraction.candidates.into_iter().zip(vectors.into_iter()) {
            match vector {
                Some(v) => {
                    embeddings_ok += 1;
                    candidates_memories.push(reconcile::candidate_to_memory(
                        candidate,
                        job.scope.clone(),
                        Some(payload.session_id.clone()),
                        self.embeddings.model_id().to_string(),
                        v,
                    ));
                }
                None => warn!(job_id = %job.id, "candidate has no embedding, dropped before consolidation"),
            }
        }

        if embeddings_ok == 0 {
            return Err(cortex_core::errors::EmbeddingError::BatchFailed {
                batch_size: candidates_memories.len(),
                reason: "embedding adapter produced no vectors for any candidate".to_string(),
            }
            .into());
        }

        let candidates_extracted = candidates_memories.len();

        // Step 4: load existing memories for the scope.
        let mut existing = self.storage.list_memories(&job.scope, &MemoryFilter::default()).await?;
        existing.truncate(self.consolidation_config.max_batch);

        // Steps 5-7: consolidate and write.
        let outcome = reconcile::reconcile(
            self.storage.as_ref(),
            self.vector.as_ref(),
            &self.consolidation_config,
            existing,
            candidates_memories,
            true,
        )
        .await?;

        let result = JobResult {
            candidates_extracted,
            embeddings_ok,
            memories_created: outcome.memories_created,
            memories_updated: outcome.memories_updated,
            memories_merged: outcome.memories_merged,
            conflicts: outcome.conflicts,
            degraded_vector_writes: outcome.degraded_vector_writes,
        };

        // Step 8: optionally publish a follow-up CONSOLIDATE job.
        let follow_up = if self.consolidation_config.auto_consolidate_threshold > 0 && outcome.active_memory_count >= self.consolidation_config.auto_consolidate_threshold {
            Some(Job::new(
                job.scope.clone(),
                JobPayload::Consolidate(ConsolidatePayload {
                    max_memories: self.consolidation_config.max_batch,
                    detect_conflicts: true,
                }),
            ))
        } else {
            None
        };

        Ok((result, follow_up))
    }

    /// Idempotent-replay guard and job-row bootstrap. The queue fabric hands
    /// the Coordinator a `Job` built straight from the wire message
    /// (`ExtractionMessage::into_job`/`ConsolidationMessage::into_job`) —
    /// its row never exists in storage yet. If this is the first delivery,
    /// insert it and return `None` so the caller proceeds normally. If the
    /// broker redelivered a message whose job already reached `COMPLETED`
    /// (the handler crashed after commit but before ack), return that
    /// terminal row so the caller can short-circuit without re-extracting,
    /// re-embedding, or writing a fresh revision (§8 "idempotent replay").
    async fn sync_job_row(&self, job: &Job) -> CortexResult<Option<Job>> {
        match self.storage.get_job(job.id).await? {
            Some(existing) if existing.status == JobStatus::Completed => Ok(Some(existing)),
            Some(_) => Ok(None),
            None => {
                self.storage.create_job(job).await?;
                Ok(None)
            }
        }
    }

    async fn try_run_consolidation(&self, job: &Job, payload: &ConsolidatePayload) -> CortexResult<JobResult> {
        let mut existing = self.storage.list_memories(&job.scope, &MemoryFilter::default()).await?;
        existing.truncate(payload.max_memories.min(self.consolidation_config.max_batch));

        let outcome = reconcile::reconcile(
            self.storage.as_ref(),
            self.vector.as_ref(),
            &self.consolidation_config,
            existing,
            Vec::new(),
            payload.detect_conflicts,
        )
        .await?;

        Ok(JobResult {
            candidates_extracted: 0,
            embeddings_ok: 0,
            memories_created: outcome.memories_created,
            memories_updated: outcome.memories_updated,
            memories_merged: outcome.memories_merged,
            conflicts: outcome.conflicts,
            degraded_vector_writes: outcome.degraded_vector_writes,
        })
    }
}

/// Copy a stored terminal job's fields onto the in-flight `job` the caller
/// was handed, so a replayed message reports the exact same result record
/// the first, successful run produced.
fn adopt_terminal_state(job: &mut Job, stored: Job) {
    job.status = stored.status;
    job.attempt_count = stored.attempt_count;
    job.last_error = stored.last_error;
    job.started_at = stored.started_at;
    job.completed_at = stored.completed_at;
    job.result = stored.result;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::events::{ConversationEvent, EventAuthor};
    use cortex_core::job::JobPayload;
    use cortex_core::scope::Scope;
    use cortex_embeddings::HashEmbeddingProvider;
    use cortex_llm::MockLlmProvider;
    use cortex_storage::SqliteStore;
    use cortex_vector::InMemoryVectorStore;
    use chrono::Utc;
    use std::sync::Mutex;

    struct FakeSessions {
        events: Mutex<Vec<ConversationEvent>>,
    }

    #[async_trait::async_trait]
    impl SessionsClient for FakeSessions {
        async fn list_events(&self, _session_id: &str, _limit: usize) -> CortexResult<Vec<ConversationEvent>> {
            Ok(self.events.lock().unwrap().clone())
        }
    }

    fn coordinator(events: Vec<ConversationEvent>, extraction_response: &str) -> Coordinator {
        Coordinator::new(
            Arc::new(FakeSessions { events: Mutex::new(events) }),
            Arc::new(MockLlmProvider::new(extraction_response.to_string())),
            Arc::new(HashEmbeddingProvider::new(8, 1000)),
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            Arc::new(InMemoryVectorStore::new(8)),
            ExtractionConfig::default(),
            ConsolidationConfig::default(),
            SessionsConfig::default(),
            cortex_core::config::EmbeddingConfig {
                dimensions: 8,
                batch_size: 10,
                ..Default::default()
            },
        )
    }

    fn event(author: EventAuthor, content: &str) -> ConversationEvent {
        ConversationEvent {
            author,
            content: content.to_string(),
            timestamp: Utc::now(),
            invocation_id: None,
        }
    }

    #[tokio::test]
    async fn empty_session_completes_with_zero_memories() {
        let coordinator = coordinator(Vec::new(), "{}");
        let mut job = Job::new(
            Scope::for_user("u1"),
            JobPayload::Extract(ExtractPayload { session_id: "s1".to_string() }),
        );
        coordinator.run_extraction_job(&mut job).await.unwrap();
        assert_eq!(job.status, cortex_core::job::JobStatus::Completed);
        assert_eq!(job.result.unwrap().memories_created, 0);
    }

    #[tokio::test]
    async fn candidate_with_embedding_is_persisted() {
        let events = vec![event(EventAuthor::User, "I live in Seattle"), event(EventAuthor::Agent, "Cool")];
        let coordinator = coordinator(
            events,
            r#"{"facts":[{"fact":"User lives in Seattle","category":"location","confidence":0.9}]}"#,
        );
        let mut job = Job::new(
            Scope::for_user("u1"),
            JobPayload::Extract(ExtractPayload { session_id: "s1".to_string() }),
        );
        coordinator.run_extraction_job(&mut job).await.unwrap();
        assert_eq!(job.status, cortex_core::job::JobStatus::Completed);
        let result = job.result.unwrap();
        assert_eq!(result.memories_created, 1);
        assert_eq!(result.candidates_extracted, 1);
        assert_eq!(result.embeddings_ok, 1);
    }

    #[tokio::test]
    async fn replayed_completed_job_does_not_redo_work() {
        let events = vec![event(EventAuthor::User, "I live in Seattle"), event(EventAuthor::Agent, "Cool")];
        let coordinator = coordinator(
            events,
            r#"{"facts":[{"fact":"User lives in Seattle","category":"location","confidence":0.9}]}"#,
        );
        let scope = Scope::for_user("u1");
        let job_id = uuid::Uuid::new_v4();

        let mut job = Job {
            id: job_id,
            ..Job::new(scope.clone(), JobPayload::Extract(ExtractPayload { session_id: "s1".to_string() }))
        };
        coordinator.run_extraction_job(&mut job).await.unwrap();
        assert_eq!(job.status, cortex_core::job::JobStatus::Completed);
        let first_result = job.result.clone().unwrap();
        assert_eq!(first_result.memories_created, 1);

        // Same job id redelivered by the broker after the handler's ack was
        // lost — must not re-extract, re-embed, or write a second memory or
        // revision, and must report the exact same result record.
        let mut replay = Job {
            id: job_id,
            ..Job::new(scope.clone(), JobPayload::Extract(ExtractPayload { session_id: "s1".to_string() }))
        };
        coordinator.run_extraction_job(&mut replay).await.unwrap();
        assert_eq!(replay.status, cortex_core::job::JobStatus::Completed);
        let replay_result = replay.result.unwrap();
        assert_eq!(replay_result.memories_created, first_result.memories_created);
        assert_eq!(replay_result.candidates_extracted, first_result.candidates_extracted);

        let memories = coordinator
            .storage
            .list_memories(&scope, &MemoryFilter::default())
            .await
            .unwrap();
        assert_eq!(memories.len(), 1);
        assert_eq!(memories[0].revision_count, 1);
    }

    #[tokio::test]
    async fn wrong_payload_kind_fails_the_job() {
        let coordinator = coordinator(Vec::new(), "{}");
        let mut job = Job::new(
            Scope::for_user("u1"),
            JobPayload::Consolidate(ConsolidatePayload { max_memories: 10, detect_conflicts: true }),
        );
        coordinator.run_extraction_job(&mut job).await.unwrap();
        assert_eq!(job.status, cortex_core::job::JobStatus::Failed);
    }

    #[tokio::test]
    async fn duplicate_candidates_across_two_jobs_merge_on_consolidation_run() {
        let events = vec![event(EventAuthor::User, "I live in Seattle"), event(EventAuthor::Agent, "Cool")];
        let coordinator = coordinator(
            events.clone(),
            r#"{"facts":[{"fact":"User lives in Seattle","category":"location","confidence":0.9}]}"#,
        );
        let scope = Scope::for_user("u1");

        let mut job1 = Job::new(scope.clone(), JobPayload::Extract(ExtractPayload { session_id: "s1".to_string() }));
        coordinator.run_extraction_job(&mut job1).await.unwrap();

        let mut job2 = Job::new(scope.clone(), JobPayload::Extract(ExtractPayload { session_id: "s2".to_string() }));
        coordinator.run_extraction_job(&mut job2).await.unwrap();

        let mut consolidate_job = Job::new(
            scope.clone(),
            JobPayload::Consolidate(ConsolidatePayload { max_memories: 500, detect_conflicts: true }),
        );
        coordinator.run_consolidation_job(&mut consolidate_job).await.unwrap();
        assert_eq!(consolidate_job.status, cortex_core::job::JobStatus::Completed);
        assert!(consolidate_job.result.unwrap().memories_merged >= 1);
    }
}
