use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

use crate::services::queue::client::{Delivery, QueueClient, QueueResult};

#[derive(Debug, Default)]
struct Lanes {
    ready: VecDeque<String>,
    in_flight: Vec<String>,
    dead: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    queues: Mutex<HashMap<String, Lanes>>,
    arrived: Notify,
}

/// In-process queue with the same lane semantics as `ValkeyQueue`.
///
/// For tests and local runs without a Valkey server. Nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryQueue {
    inner: Arc<Inner>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_declared(&self, queue: &str) -> bool {
        self.inner.queues.lock().await.contains_key(queue)
    }

    pub async fn ready(&self, queue: &str) -> Vec<String> {
        self.snapshot(queue, |l| l.ready.iter().cloned().collect())
            .await
    }

    pub async fn in_flight(&self, queue: &str) -> Vec<String> {
        self.snapshot(queue, |l| l.in_flight.clone()).await
    }

    pub async fn dead_letters(&self, queue: &str) -> Vec<String> {
        self.snapshot(queue, |l| l.dead.clone()).await
    }

    async fn snapshot(&self, queue: &str, f: impl Fn(&Lanes) -> Vec<String>) -> Vec<String> {
        self.inner
            .queues
            .lock()
            .await
            .get(queue)
            .map(f)
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueueClient for MemoryQueue {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn declare(&self, queue: &str) -> QueueResult<()> {
        self.inner
            .queues
            .lock()
            .await
            .entry(queue.to_string())
            .or_default();
        Ok(())
    }

    async fn push(&self, queue: &str, payload: &str) -> QueueResult<()> {
        self.inner
            .queues
            .lock()
            .await
            .entry(queue.to_string())
            .or_default()
            .ready
            .push_back(payload.to_string());

        self.inner.arrived.notify_waiters();
        Ok(())
    }

    async fn reserve(&self, queue: &str, wait: Duration) -> QueueResult<Option<Delivery>> {
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            // Register interest before looking, so a push in between still wakes us.
            let arrived = self.inner.arrived.notified();
            tokio::pin!(arrived);
            arrived.as_mut().enable();

            {
                let mut queues = self.inner.queues.lock().await;
                let lanes = queues.entry(queue.to_string()).or_default();
                if let Some(payload) = lanes.ready.pop_front() {
                    lanes.in_flight.push(payload.clone());
                    return Ok(Some(Delivery {
                        queue: queue.to_string(),
                        payload,
                    }));
                }
            }

            if tokio::time::timeout_at(deadline, arrived).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut queues = self.inner.queues.lock().await;
        if let Some(lanes) = queues.get_mut(&delivery.queue) {
            take_in_flight(lanes, &delivery.payload);
        }
        Ok(())
    }

    async fn dead_letter(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut queues = self.inner.queues.lock().await;
        let lanes = queues.entry(delivery.queue.clone()).or_default();
        take_in_flight(lanes, &delivery.payload);
        lanes.dead.push(delivery.payload.clone());
        Ok(())
    }
}

fn take_in_flight(lanes: &mut Lanes, payload: &str) {
    if let Some(pos) = lanes.in_flight.iter().position(|p| p == payload) {
        lanes.in_flight.remove(pos);
    }
}
