//! Health snapshot: a point-in-time view of whether each backing subsystem
//! (queue broker, relational store, vector store, LLM/embedding providers)
//! is reachable. Callers probe their own subsystem and record the result
//! here; this module doesn't own any connections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemStatus {
    pub healthy: bool,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthReport {
    pub subsystems: BTreeMap<String, SubsystemStatus>,
}

impl HealthReport {
    /// Overall health is the conjunction of every recorded subsystem.
    /// A report with no recorded subsystems is considered healthy — there's
    /// nothing yet known to be unhealthy.
    pub fn is_healthy(&self) -> bool {
        self.subsystems.values().all(|s| s.healthy)
    }

    pub fn unhealthy_subsystems(&self) -> Vec<&str> {
        self.subsystems
            .iter()
            .filter(|(_, status)| !status.healthy)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Accumulates subsystem health checks into a [`HealthReport`].
#[derive(Debug, Default)]
pub struct HealthChecker {
    report: HealthReport,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, subsystem: impl Into<String>, healthy: bool, detail: Option<String>) {
        self.report
            .subsystems
            .insert(subsystem.into(), SubsystemStatus { healthy, detail });
    }

    pub fn report(&self) -> HealthReport {
        self.report.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_healthy() {
        assert!(HealthChecker::new().report().is_healthy());
    }

    #[test]
    fn one_unhealthy_subsystem_marks_the_whole_report_unhealthy() {
        let mut checker = HealthChecker::new();
        checker.record("vector", true, None);
        checker.record("storage", false, Some("connection refused".to_string()));
        let report = checker.report();
        assert!(!report.is_healthy());
        assert_eq!(report.unhealthy_subsystems(), vec!["storage"]);
    }
}
