//! # cortex-embeddings
//!
//! Embedding Adapter: batch text-to-vector with a fixed dimension per
//! provider instance, deterministic character-based truncation at the token
//! budget, and batch-level failure handling.

mod batching;
mod http;
mod mock;
mod truncation;

pub use batching::embed_batched;
pub use http::HttpEmbeddingProvider;
pub use mock::HashEmbeddingProvider;
pub use truncation::truncate_to_token_budget;
