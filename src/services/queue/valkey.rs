use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

use crate::services::queue::client::{Delivery, QueueClient, QueueError, QueueResult};

// LMOVE is polled instead of using BLMOVE: a blocking command would stall the
// multiplexed connection shared with publishers.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Valkey/Redis-backed work queue.
///
/// Each queue uses three lists:
/// - `<prefix>:<queue>`            ready messages
/// - `<prefix>:<queue>:processing` reserved, not yet settled
/// - `<prefix>:<queue>:dead`       messages whose handler failed
///
/// Durability is whatever persistence the server is configured with.
#[derive(Clone, Debug)]
pub struct ValkeyQueue {
    manager: redis::aio::ConnectionManager,
    prefix: String,
}

impl ValkeyQueue {
    // Create a queue client from a URL like `redis://localhost:6379`
    pub async fn new(url: &str) -> QueueResult<Self> {
        Self::new_with_prefix(url, "mq").await
    }

    pub async fn new_with_prefix(url: &str, prefix: impl Into<String>) -> QueueResult<Self> {
        let client =
            redis::Client::open(url).map_err(|e| QueueError::BackendConnection(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| QueueError::BackendConnection(e.to_string()))?;

        Ok(Self {
            manager,
            prefix: prefix.into(),
        })
    }

    fn ready_key(&self, queue: &str) -> String {
        format!("{}:{}", self.prefix, queue)
    }

    fn processing_key(&self, queue: &str) -> String {
        format!("{}:{}:processing", self.prefix, queue)
    }

    fn dead_key(&self, queue: &str) -> String {
        format!("{}:{}:dead", self.prefix, queue)
    }

    fn registry_key(&self) -> String {
        format!("{}:queues", self.prefix)
    }
}

fn command_error(e: redis::RedisError) -> QueueError {
    QueueError::BackendCommand(e.to_string())
}

#[async_trait]
impl QueueClient for ValkeyQueue {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn declare(&self, queue: &str) -> QueueResult<()> {
        // Lists exist implicitly; the registry set lets tooling enumerate queues.
        let mut conn = self.manager.clone();

        let _: i64 = redis::cmd("SADD")
            .arg(self.registry_key())
            .arg(queue)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;

        Ok(())
    }

    async fn push(&self, queue: &str, payload: &str) -> QueueResult<()> {
        let mut conn = self.manager.clone();

        let _: i64 = redis::cmd("RPUSH")
            .arg(self.ready_key(queue))
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;

        Ok(())
    }

    async fn reserve(&self, queue: &str, wait: Duration) -> QueueResult<Option<Delivery>> {
        let deadline = Instant::now() + wait;
        let ready = self.ready_key(queue);
        let processing = self.processing_key(queue);

        loop {
            let mut conn = self.manager.clone();

            // LMOVE <ready> <processing> LEFT RIGHT
            // - returns the moved element
            // - returns Nil when the ready list is empty
            let moved: Option<String> = redis::cmd("LMOVE")
                .arg(&ready)
                .arg(&processing)
                .arg("LEFT")
                .arg("RIGHT")
                .query_async(&mut conn)
                .await
                .map_err(command_error)?;

            if let Some(payload) = moved {
                return Ok(Some(Delivery {
                    queue: queue.to_string(),
                    payload,
                }));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn ack(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut conn = self.manager.clone();

        // LREM returns the number of removed elements (0 or 1 here).
        let _: i64 = redis::cmd("LREM")
            .arg(self.processing_key(&delivery.queue))
            .arg(1)
            .arg(&delivery.payload)
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;

        Ok(())
    }

    async fn dead_letter(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut conn = self.manager.clone();

        redis::pipe()
            .atomic()
            .cmd("LREM")
            .arg(self.processing_key(&delivery.queue))
            .arg(1)
            .arg(&delivery.payload)
            .ignore()
            .cmd("RPUSH")
            .arg(self.dead_key(&delivery.queue))
            .arg(&delivery.payload)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(command_error)?;

        Ok(())
    }
}
