//! # cortex-queue
//!
//! The Asynchronous dispatch fabric (§2, component 7): two durable AMQP
//! queues, a bounded consumer pool per process, and the two worker binaries
//! that drive [`cortex_coordinator::Coordinator`]. At-least-once delivery is
//! handled here (prefetch, ack/nack, dead-letter); idempotence on replay is
//! the Coordinator's responsibility via the `(memory_id, revision_number)`
//! revision key.

pub mod messages;
pub mod publisher;
pub mod topology;
pub mod worker;

pub use messages::{ConsolidationMessage, ExtractionMessage};
pub use publisher::Publisher;
pub use topology::{declare_topology, CONSOLIDATION_QUEUE, DEAD_LETTER_EXCHANGE, EXTRACTION_QUEUE};
pub use worker::Worker;
