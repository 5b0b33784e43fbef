//! Queue client interface used by `QueueBus`.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Queue-layer errors (transport/command/serialization).
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue connection error: {0}")]
    BackendConnection(String),
    #[error("queue command error: {0}")]
    BackendCommand(String),
    #[error("message serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("queue bus is closed")]
    Closed,
}

/// A message taken off a queue and not yet settled.
///
/// Until `ack` or `dead_letter` is called it sits in the queue's in-flight lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub queue: String,
    pub payload: String,
}

/// A minimal work-queue interface over JSON text payloads.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait QueueClient: Clone + Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Make sure the queue exists before use. Idempotent.
    async fn declare(&self, queue: &str) -> QueueResult<()>;

    // Append a payload to the tail of the queue.
    async fn push(&self, queue: &str, payload: &str) -> QueueResult<()>;

    // Move the head message into the in-flight lane.
    //
    // Returns `Ok(None)` when nothing arrived within `wait`.
    async fn reserve(&self, queue: &str, wait: Duration) -> QueueResult<Option<Delivery>>;

    // Drop a processed message from the in-flight lane.
    async fn ack(&self, delivery: &Delivery) -> QueueResult<()>;

    // Move a message that could not be processed to the queue's dead-letter lane.
    async fn dead_letter(&self, delivery: &Delivery) -> QueueResult<()>;
}
