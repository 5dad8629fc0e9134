//! Thin publish-side wrapper: persistent messages on the routing key that
//! matches the target queue name, used both by an external producer and by
//! the Coordinator's own follow-up `CONSOLIDATE` jobs (§4.7.1 step 8).

use cortex_core::errors::QueueError;
use cortex_core::CortexResult;
use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};
use serde::Serialize;

use crate::messages::ConsolidationMessage;
use crate::topology::CONSOLIDATION_QUEUE;

/// The direct exchange work queues are published through; queue names
/// double as routing keys, matching the dead-letter topology in
/// `topology::declare_topology`.
const DEFAULT_EXCHANGE: &str = "";

pub struct Publisher {
    channel: Channel,
}

impl Publisher {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    pub async fn publish_consolidation(&self, message: &ConsolidationMessage) -> CortexResult<()> {
        self.publish(CONSOLIDATION_QUEUE, message).await
    }

    async fn publish<T: Serialize>(&self, queue: &str, message: &T) -> CortexResult<()> {
        let body = serde_json::to_vec(message).map_err(|e| QueueError::PublishFailed {
            queue: queue.to_string(),
            reason: format!("failed to serialize message: {e}"),
        })?;

        self.channel
            .basic_publish(
                DEFAULT_EXCHANGE,
                queue,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|e| QueueError::PublishFailed {
                queue: queue.to_string(),
                reason: e.to_string(),
            })?
            .await
            .map_err(|e| QueueError::PublishFailed {
                queue: queue.to_string(),
                reason: format!("publisher confirm failed: {e}"),
            })?;

        Ok(())
    }
}
