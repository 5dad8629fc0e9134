//! # cortex-llm
//!
//! LLM Adapter: a uniform request to a chat LLM with JSON-schema-constrained
//! output, classifying upstream failures into transient (retried here, with
//! exponential backoff) and permanent (surfaced immediately).

mod http;
mod mock;
mod retry;

pub use http::HttpLlmProvider;
pub use mock::MockLlmProvider;
pub use retry::retry_transient;
