//! Declares the durable queue/exchange topology: two work queues plus a
//! shared dead-letter exchange that preserves the original routing key, per
//! §6 ("dead-letter exchange receives messages after N redeliveries with
//! original routing key preserved").

use cortex_core::errors::QueueError;
use cortex_core::CortexResult;
use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Channel, ExchangeKind};

pub const EXTRACTION_QUEUE: &str = "extraction.requests";
pub const CONSOLIDATION_QUEUE: &str = "consolidation.requests";
pub const DEAD_LETTER_EXCHANGE: &str = "cortex.dead_letter";

fn to_queue_err(queue: &str, e: lapin::Error) -> cortex_core::CortexError {
    QueueError::ConsumerSetupFailed {
        queue: queue.to_string(),
        reason: e.to_string(),
    }
    .into()
}

/// Idempotent: declares the dead-letter exchange, then both durable work
/// queues bound to it so rejected messages land on a queue named after the
/// original with a `.dead_letter` suffix, keeping the routing key intact.
pub async fn declare_topology(channel: &Channel) -> CortexResult<()> {
    channel
        .exchange_declare(
            DEAD_LETTER_EXCHANGE,
            ExchangeKind::Direct,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| to_queue_err(DEAD_LETTER_EXCHANGE, e))?;

    for queue in [EXTRACTION_QUEUE, CONSOLIDATION_QUEUE] {
        declare_work_queue(channel, queue).await?;
    }

    Ok(())
}

async fn declare_work_queue(channel: &Channel, queue: &str) -> CortexResult<()> {
    let dead_letter_queue = format!("{queue}.dead_letter");

    channel
        .queue_declare(
            &dead_letter_queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| to_queue_err(&dead_letter_queue, e))?;

    channel
        .queue_bind(
            &dead_letter_queue,
            DEAD_LETTER_EXCHANGE,
            queue,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(|e| to_queue_err(&dead_letter_queue, e))?;

    let mut args = FieldTable::default();
    args.insert("x-dead-letter-exchange".into(), DEAD_LETTER_EXCHANGE.into());
    args.insert("x-dead-letter-routing-key".into(), queue.into());

    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            args,
        )
        .await
        .map_err(|e| to_queue_err(queue, e))?;

    Ok(())
}
