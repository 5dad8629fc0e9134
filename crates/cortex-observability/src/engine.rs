//! [`ObservabilityEngine`]: the one ambient-concern handle a worker process
//! holds alongside its connection pools — health snapshots, outstanding
//! degraded-vector-write tracking, and the local query log.

use crate::degradation::{DegradationEvent, DegradationTracker};
use crate::health::{HealthChecker, HealthReport};
use crate::query_log::{QueryLog, QueryLogEntry};

#[derive(Debug, Default)]
pub struct ObservabilityEngine {
    health: HealthChecker,
    degradation: DegradationTracker,
    query_log: QueryLog,
}

impl ObservabilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_health(&mut self, subsystem: impl Into<String>, healthy: bool, detail: Option<String>) {
        self.health.record(subsystem, healthy, detail);
    }

    pub fn health_report(&self) -> HealthReport {
        self.health.report()
    }

    pub fn record_degradation(&mut self, event: DegradationEvent) {
        self.degradation.record(event);
    }

    pub fn mark_reconciled(&mut self, memory_id: uuid::Uuid) {
        self.degradation.mark_reconciled(memory_id);
    }

    pub fn outstanding_degraded_count(&self) -> usize {
        self.degradation.outstanding_count()
    }

    pub fn record_query(&mut self, entry: QueryLogEntry) {
        self.query_log.record(entry);
    }

    pub fn recent_queries(&self, limit: usize) -> Vec<&QueryLogEntry> {
        self.query_log.recent(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_engine_is_healthy_with_no_outstanding_degradation() {
        let engine = ObservabilityEngine::new();
        assert!(engine.health_report().is_healthy());
        assert_eq!(engine.outstanding_degraded_count(), 0);
    }
}
