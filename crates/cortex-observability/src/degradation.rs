//! Tracks `PARTIAL_DEGRADED` occurrences (§7): a job whose relational writes
//! committed but whose vector upsert failed. Not a retry mechanism — just
//! the bookkeeping an operator (or the out-of-core-scope background
//! reconciler) needs to see what's waiting to be resynced.

use chrono::{DateTime, Utc};
use cortex_core::scope::Scope;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DegradationEvent {
    pub job_id: Uuid,
    pub scope: Scope,
    pub memory_ids: Vec<Uuid>,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

/// In-memory ledger of outstanding degraded-vector-write events. A memory id
/// is considered resynced once [`DegradationTracker::mark_reconciled`] is
/// called for it; that removes it from every outstanding event, dropping the
/// event entirely once its memory list is empty.
#[derive(Debug, Default)]
pub struct DegradationTracker {
    events: Vec<DegradationEvent>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DegradationEvent) {
        self.events.push(event);
    }

    pub fn outstanding(&self) -> &[DegradationEvent] {
        &self.events
    }

    pub fn outstanding_count(&self) -> usize {
        self.events.iter().map(|e| e.memory_ids.len()).sum()
    }

    pub fn mark_reconciled(&mut self, memory_id: Uuid) {
        for event in &mut self.events {
            event.memory_ids.retain(|id| *id != memory_id);
        }
        self.events.retain(|e| !e.memory_ids.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ids: Vec<Uuid>) -> DegradationEvent {
        DegradationEvent {
            job_id: Uuid::new_v4(),
            scope: Scope::for_user("u1"),
            memory_ids: ids,
            reason: "vector store unreachable".to_string(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn reconciling_the_only_memory_drops_the_event() {
        let mut tracker = DegradationTracker::new();
        let id = Uuid::new_v4();
        tracker.record(event(vec![id]));
        assert_eq!(tracker.outstanding_count(), 1);
        tracker.mark_reconciled(id);
        assert_eq!(tracker.outstanding_count(), 0);
        assert!(tracker.outstanding().is_empty());
    }

    #[test]
    fn reconciling_one_of_many_leaves_the_event_in_place() {
        let mut tracker = DegradationTracker::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        tracker.record(event(vec![a, b]));
        tracker.mark_reconciled(a);
        assert_eq!(tracker.outstanding_count(), 1);
        assert_eq!(tracker.outstanding()[0].memory_ids, vec![b]);
    }
}
