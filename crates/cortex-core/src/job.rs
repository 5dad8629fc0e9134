//! The unit of at-least-once work processed by the queue fabric.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scope::Scope;

/// Which stage a job drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Extract,
    Consolidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Payload for an `Extract` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractPayload {
    pub session_id: String,
}

/// Payload for a `Consolidate` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatePayload {
    pub max_memories: usize,
    pub detect_conflicts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobPayload {
    Extract(ExtractPayload),
    Consolidate(ConsolidatePayload),
}

impl JobPayload {
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::Extract(_) => JobKind::Extract,
            JobPayload::Consolidate(_) => JobKind::Consolidate,
        }
    }
}

/// Aggregate outcome counters a job reports on completion, per §4.7.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobResult {
    pub candidates_extracted: usize,
    pub embeddings_ok: usize,
    pub memories_created: usize,
    pub memories_updated: usize,
    pub memories_merged: usize,
    pub conflicts: usize,
    /// Relational writes committed but the vector upsert failed; the result
    /// is still COMPLETED, a background reconciler resyncs later.
    pub degraded_vector_writes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub scope: Scope,
    pub payload: JobPayload,
    pub status: JobStatus,
    pub attempt_count: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<JobResult>,
}

impl Job {
    pub fn new(scope: Scope, payload: JobPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope,
            payload,
            status: JobStatus::Pending,
            attempt_count: 0,
            last_error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.payload.kind()
    }

    pub fn mark_running(&mut self) {
        self.status = JobStatus::Running;
        self.attempt_count += 1;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self, result: JobResult) {
        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.result = Some(result);
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.last_error = Some(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_starts_pending() {
        let job = Job::new(
            Scope::for_user("u1"),
            JobPayload::Extract(ExtractPayload {
                session_id: "s1".to_string(),
            }),
        );
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.kind(), JobKind::Extract);
    }

    #[test]
    fn mark_running_increments_attempt_count() {
        let mut job = Job::new(
            Scope::for_user("u1"),
            JobPayload::Consolidate(ConsolidatePayload {
                max_memories: 500,
                detect_conflicts: true,
            }),
        );
        job.mark_running();
        job.mark_running();
        assert_eq!(job.attempt_count, 2);
        assert_eq!(job.status, JobStatus::Running);
    }

    #[test]
    fn mark_completed_sets_result() {
        let mut job = Job::new(
            Scope::for_user("u1"),
            JobPayload::Extract(ExtractPayload {
                session_id: "s1".to_string(),
            }),
        );
        job.mark_running();
        job.mark_completed(JobResult {
            memories_created: 3,
            ..Default::default()
        });
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result.unwrap().memories_created, 3);
    }

    #[test]
    fn mark_failed_records_last_error() {
        let mut job = Job::new(
            Scope::for_user("u1"),
            JobPayload::Extract(ExtractPayload {
                session_id: "s1".to_string(),
            }),
        );
        job.mark_failed("permanent upstream error");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.last_error.as_deref(), Some("permanent upstream error"));
    }
}
