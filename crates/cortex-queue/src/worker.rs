//! The consumer pool: one task per in-flight message up to `prefetch_count`,
//! explicit ack on success, nack-with-requeue on transient failure,
//! dead-lettering after `dead_letter_after` redeliveries, graceful shutdown
//! that drains in-flight handlers before closing the channel (§5).

use std::sync::Arc;
use std::time::Duration;

use cortex_core::config::QueueConfig;
use cortex_core::errors::QueueError;
use cortex_core::CortexResult;
use futures_util::StreamExt;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{Channel, Connection, ConnectionProperties};
use serde::de::DeserializeOwned;
use tokio::sync::{watch, Semaphore};
use tracing::{error, info, warn};

/// A delivery's prior-redelivery count, read from the AMQP `x-death` header
/// the broker stamps on messages it has routed through a dead-letter cycle.
/// Absent on first delivery.
fn death_count(delivery: &lapin::message::Delivery) -> u32 {
    let Some(headers) = delivery.properties.headers().as_ref() else {
        return 0;
    };
    let Some(AMQPValue::FieldArray(deaths)) = headers.inner().get("x-death") else {
        return 0;
    };
    let Some(AMQPValue::FieldTable(first)) = deaths.as_slice().first() else {
        return 0;
    };
    match first.inner().get("count") {
        Some(AMQPValue::LongLongInt(n)) => (*n).max(0) as u32,
        Some(AMQPValue::LongUInt(n)) => *n,
        _ => 0,
    }
}

/// Connects to the broker, declares the shared topology, and exposes a
/// per-queue consume loop. One `Worker` per process; `run` is called once
/// per queue that process handles (extraction worker consumes only
/// `extraction.requests`, consolidation worker only `consolidation.requests`).
pub struct Worker {
    connection: Connection,
    channel: Channel,
    config: QueueConfig,
}

impl Worker {
    pub async fn connect(config: QueueConfig) -> CortexResult<Self> {
        let connection = Connection::connect(&config.queue_url, ConnectionProperties::default())
            .await
            .map_err(|e| QueueError::ConnectionFailed { reason: e.to_string() })?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| QueueError::ConnectionFailed { reason: e.to_string() })?;
        channel
            .basic_qos(config.worker_prefetch, BasicQosOptions::default())
            .await
            .map_err(|e| QueueError::ConnectionFailed { reason: e.to_string() })?;
        crate::topology::declare_topology(&channel).await?;
        Ok(Self { connection, channel, config })
    }

    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    /// Connect with `attempts` retries on initial connection failure,
    /// exit-code-2-worthy per §6 if the broker stays unreachable.
    pub async fn connect_with_retry(config: QueueConfig, attempts: u32) -> CortexResult<Self> {
        let mut last_err = None;
        for attempt in 1..=attempts {
            match Self::connect(config.clone()).await {
                Ok(worker) => return Ok(worker),
                Err(e) => {
                    warn!(attempt, max = attempts, error = %e, "broker connection attempt failed");
                    last_err = Some(e);
                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                }
            }
        }
        Err(last_err.unwrap_or_else(|| QueueError::BrokerUnreachable { attempts }.into()))
    }

    /// Consume `queue` until `shutdown` fires, dispatching each message to
    /// `handle` with bounded concurrency (`worker_concurrency`). `handle`
    /// returns `Ok(true)` to ack, `Ok(false)` to nack without requeue
    /// (permanent failure, §7's `UPSTREAM_PERMANENT`/`INVALID_INPUT`), or
    /// `Err` to nack with requeue (transient, §7's `UPSTREAM_TRANSIENT`).
    pub async fn run<T, F, Fut>(
        &self,
        queue: &str,
        mut shutdown: watch::Receiver<bool>,
        handle: F,
    ) -> CortexResult<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = CortexResult<bool>> + Send + 'static,
    {
        let handle = Arc::new(handle);
        let semaphore = Arc::new(Semaphore::new(self.config.worker_concurrency));
        let dead_letter_after = self.config.dead_letter_after;

        let mut consumer = self
            .channel
            .basic_consume(
                queue,
                &self.config.worker_name,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| QueueError::ConsumerSetupFailed {
                queue: queue.to_string(),
                reason: e.to_string(),
            })?;

        let mut in_flight = Vec::new();

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!(queue, "shutdown signaled, draining in-flight handlers");
                        break;
                    }
                }
                delivery = consumer.next() => {
                    let Some(delivery) = delivery else { break };
                    let delivery = match delivery {
                        Ok(d) => d,
                        Err(e) => {
                            error!(queue, error = %e, "consumer stream error");
                            continue;
                        }
                    };

                    let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
                    let handle = handle.clone();
                    let queue_name = queue.to_string();
                    let redeliveries = death_count(&delivery);

                    let task = tokio::spawn(async move {
                        let _permit = permit;
                        let payload: Result<T, _> = serde_json::from_slice(&delivery.data);
                        let outcome = match payload {
                            Err(e) => {
                                warn!(queue = %queue_name, error = %e, "malformed message, dead-lettering");
                                Ok(false)
                            }
                            Ok(message) => handle(message).await,
                        };

                        match outcome {
                            Ok(true) => {
                                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                                    error!(queue = %queue_name, error = %e, "ack failed");
                                }
                            }
                            Ok(false) => {
                                if let Err(e) = delivery.nack(BasicNackOptions { requeue: false, ..Default::default() }).await {
                                    error!(queue = %queue_name, error = %e, "nack (no requeue) failed");
                                }
                            }
                            Err(e) => {
                                let requeue = redeliveries + 1 < dead_letter_after;
                                warn!(queue = %queue_name, error = %e, redeliveries, requeue, "transient handler failure");
                                if let Err(e) = delivery.nack(BasicNackOptions { requeue, ..Default::default() }).await {
                                    error!(queue = %queue_name, error = %e, "nack failed");
                                }
                            }
                        }
                    });
                    in_flight.push(task);
                    in_flight.retain(|t: &tokio::task::JoinHandle<()>| !t.is_finished());
                }
            }
        }

        let drain = Duration::from_secs(self.config.worker_drain_timeout_s);
        if tokio::time::timeout(drain, futures_util::future::join_all(in_flight)).await.is_err() {
            warn!(queue, "drain timeout elapsed with handlers still in flight");
        }

        Ok(())
    }

    pub async fn close(self) -> CortexResult<()> {
        self.channel
            .close(200, "graceful shutdown")
            .await
            .map_err(|e| QueueError::ConnectionFailed { reason: e.to_string() })?;
        self.connection
            .close(200, "graceful shutdown")
            .await
            .map_err(|e| QueueError::ConnectionFailed { reason: e.to_string() })?;
        Ok(())
    }
}
