/// Queue fabric errors (broker connectivity, publish/consume).
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("broker connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("broker unreachable after {attempts} attempts")]
    BrokerUnreachable { attempts: u32 },

    #[error("publish failed on queue {queue}: {reason}")]
    PublishFailed { queue: String, reason: String },

    #[error("consumer setup failed on queue {queue}: {reason}")]
    ConsumerSetupFailed { queue: String, reason: String },

    #[error("message payload could not be decoded: {reason}")]
    MalformedMessage { reason: String },

    #[error("message dead-lettered after {deliveries} deliveries")]
    DeadLettered { deliveries: u32 },
}
