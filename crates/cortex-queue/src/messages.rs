//! Wire shapes for the two durable queues (§6). Messages are UTF-8 JSON;
//! these types are the only contract between a publisher (the Coordinator's
//! follow-up jobs, or an external producer) and a worker's consumer loop.

use cortex_core::job::{ConsolidatePayload, ExtractPayload, Job, JobPayload, JobStatus};
use cortex_core::scope::Scope;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `extraction.requests` message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMessage {
    pub job_id: Uuid,
    pub session_id: String,
    pub user_id: String,
    pub scope: Scope,
}

/// `consolidation.requests` message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationMessage {
    pub job_id: Uuid,
    pub scope: Scope,
    pub max_memories: usize,
    pub detect_conflicts: bool,
}

impl ExtractionMessage {
    pub fn into_job(self) -> Job {
        Job {
            id: self.job_id,
            scope: self.scope,
            payload: JobPayload::Extract(ExtractPayload {
                session_id: self.session_id,
            }),
            status: JobStatus::Pending,
            attempt_count: 0,
            last_error: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
        }
    }
}

impl ConsolidationMessage {
    pub fn into_job(self) -> Job {
        Job {
            id: self.job_id,
            scope: self.scope,
            payload: JobPayload::Consolidate(ConsolidatePayload {
                max_memories: self.max_memories,
                detect_conflicts: self.detect_conflicts,
            }),
            status: JobStatus::Pending,
            attempt_count: 0,
            last_error: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
        }
    }

    /// Build the follow-up message the Coordinator publishes when a scope's
    /// memory count crosses the auto-consolidate threshold (§4.7.1 step 8).
    pub fn from_job(job: &Job) -> Option<Self> {
        match &job.payload {
            JobPayload::Consolidate(p) => Some(Self {
                job_id: job.id,
                scope: job.scope.clone(),
                max_memories: p.max_memories,
                detect_conflicts: p.detect_conflicts,
            }),
            JobPayload::Extract(_) => None,
        }
    }
}
