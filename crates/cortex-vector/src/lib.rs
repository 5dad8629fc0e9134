//! # cortex-vector
//!
//! Vector Store Gateway: a single scope-agnostic `memories` collection with
//! cosine distance, behind the `VectorStore` trait from `cortex-core`.
//! Tenant isolation is a payload equality filter (`scope.<key>`), not a
//! separate collection per scope — matching §6's "collection named
//! `memories` with payload schema `{ memory_id, scope.*, confidence, topic? }`".

mod mock;
mod qdrant;

pub use mock::InMemoryVectorStore;
pub use qdrant::QdrantVectorStore;
