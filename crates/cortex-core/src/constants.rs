//! System-wide defaults. Each is also exposed as a `CortexConfig` field so it
//! can be overridden at runtime; the constant is the value used when no
//! override is configured.

/// Cortex system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum number of events required to attempt extraction.
pub const DEFAULT_MIN_EVENTS: usize = 2;

/// Minimum accepted fact length, in characters.
pub const DEFAULT_MIN_FACT_LEN: usize = 10;

/// Maximum accepted fact length, in characters.
pub const DEFAULT_MAX_FACT_LEN: usize = 500;

/// Maximum number of facts kept from a single extraction call.
pub const DEFAULT_MAX_FACTS_PER_EXTRACTION: usize = 20;

/// Default minimum confidence for an extracted candidate to survive filtering.
pub const DEFAULT_EXTRACTION_MIN_CONFIDENCE: f64 = 0.5;

/// Below this similarity, two memories are unrelated.
pub const DEFAULT_CONFLICT_THRESHOLD: f64 = 0.70;

/// At or above this similarity, two memories are merge candidates.
pub const DEFAULT_MERGE_THRESHOLD: f64 = 0.85;

/// Confidence boost applied to a merged memory.
pub const DEFAULT_MERGE_BOOST: f64 = 0.10;

/// Maximum number of memories considered in one consolidation pass.
pub const DEFAULT_MAX_CONSOLIDATION_BATCH: usize = 500;

/// Default embedding batch size.
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;

/// Default embedding dimension when nothing else is configured.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

/// Default max input tokens before truncation, embedding adapter.
pub const DEFAULT_EMBEDDING_MAX_INPUT_TOKENS: usize = 8191;

/// Default broker prefetch count.
pub const DEFAULT_WORKER_PREFETCH: u16 = 8;

/// Default number of redeliveries before dead-lettering.
pub const DEFAULT_DEAD_LETTER_AFTER: u32 = 5;

/// Default graceful-shutdown drain timeout, seconds.
pub const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 30;

/// Default LLM/embedding adapter retry budget.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default adapter request timeout, seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of keys a `Scope` may carry.
pub const MAX_SCOPE_KEYS: usize = 5;

/// Maximum number of hits a single retrieval query may request.
pub const MAX_RETRIEVAL_LIMIT: usize = 200;

/// Default weight given to stored confidence when blending it with vector
/// similarity into a retrieval hit's final score. `0.0` is pure semantic
/// distance; `1.0` would ignore similarity entirely.
pub const DEFAULT_CONFIDENCE_WEIGHT: f64 = 0.2;
