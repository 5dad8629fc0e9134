//! # cortex-observability
//!
//! The ambient observability stack every other crate instruments through:
//! `tracing` setup and span names, a health-snapshot checker, degraded
//! vector-write tracking (§7's `PARTIAL_DEGRADED`), and a bounded local
//! query log. Carried regardless of the distilled spec's "metrics wiring is
//! out of scope" non-goal — that excludes an external metrics *vendor*
//! integration, not structured health/log output.

pub mod degradation;
pub mod engine;
pub mod health;
pub mod query_log;
pub mod tracing_setup;

pub use degradation::{DegradationEvent, DegradationTracker};
pub use engine::ObservabilityEngine;
pub use health::{HealthChecker, HealthReport, SubsystemStatus};
pub use query_log::{QueryLog, QueryLogEntry};
