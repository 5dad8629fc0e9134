//! Job builders for coordinator and queue tests.

use cortex_core::job::{ConsolidatePayload, ExtractPayload, Job, JobPayload};
use cortex_core::scope::Scope;

pub fn extract_job(scope: Scope, session_id: impl Into<String>) -> Job {
    Job::new(scope, JobPayload::Extract(ExtractPayload { session_id: session_id.into() }))
}

pub fn consolidate_job(scope: Scope, max_memories: usize, detect_conflicts: bool) -> Job {
    Job::new(scope, JobPayload::Consolidate(ConsolidatePayload { max_memories, detect_conflicts }))
}
