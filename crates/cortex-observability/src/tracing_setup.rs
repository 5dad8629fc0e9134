//! Process-wide `tracing` initialization and the span names each pipeline
//! stage instruments under. One `fmt` layer, env-filter controlled, with an
//! optional JSON formatter for production deployments.

use tracing_subscriber::{fmt, EnvFilter};

/// Span name each stage opens. Kept as constants rather than ad-hoc string
/// literals scattered through the workspace so a trace query can filter on
/// a stable name.
pub mod spans {
    pub const EXTRACTION: &str = "cortex.extraction";
    pub const EMBEDDING: &str = "cortex.embedding";
    pub const CONSOLIDATION: &str = "cortex.consolidation";
    pub const COORDINATOR: &str = "cortex.coordinator";
    pub const QUEUE: &str = "cortex.queue";
    pub const RETRIEVAL: &str = "cortex.retrieval";
}

/// Install the global subscriber. `json` selects the structured formatter
/// used in production; plain-text is easier to read in a dev terminal.
/// Reads `RUST_LOG` (default `info`) via `EnvFilter`.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = fmt().with_env_filter(filter);
    if json {
        registry.json().init();
    } else {
        registry.init();
    }
}
