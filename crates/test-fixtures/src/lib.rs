//! Shared test builders used by property and integration tests across the
//! workspace: memory/job/event construction and an in-process
//! [`SessionsClient`](cortex_core::traits::SessionsClient) double. Real
//! in-process doubles for the vector and relational gateways already live in
//! `cortex-vector::InMemoryVectorStore` and `cortex-storage::SqliteStore`'s
//! `:memory:` mode; this crate only adds what neither of those cover.

mod events;
mod fake_sessions;
mod job;
mod memory;

pub use events::{agent_turn, exchange, turn, user_turn};
pub use fake_sessions::FakeSessionsClient;
pub use job::{consolidate_job, extract_job};
pub use memory::MemoryBuilder;
