//! JSON publish/subscribe over a [`QueueClient`].
//!
//! - `publish` declares the queue, serializes the value and appends it.
//! - `subscribe` declares the queue and spawns a worker that decodes each
//!   message and hands it to the handler. A message is acknowledged only
//!   after the handler returns `Ok`; undecodable messages and failed (or
//!   panicked) handlers send it to the dead-letter lane instead.
//! - `close` stops the workers and rejects further use.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::services::queue::client::{Delivery, QueueClient, QueueError, QueueResult};
use crate::services::queue::valkey::ValkeyQueue;

const DEFAULT_POLL: Duration = Duration::from_secs(1);

pub struct QueueBus<C: QueueClient> {
    client: C,
    closed: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    poll: Duration,
}

impl QueueBus<ValkeyQueue> {
    /// Connect to a Valkey/Redis server, e.g. `redis://localhost:6379`.
    pub async fn connect(url: &str) -> QueueResult<Self> {
        let client = ValkeyQueue::new(url).await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to connect to queue backend");
        })?;

        tracing::info!(backend = client.backend_name(), "connected to queue backend");
        Ok(Self::new(client))
    }
}

impl<C: QueueClient> QueueBus<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            closed: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Vec::new()),
            poll: DEFAULT_POLL,
        }
    }

    /// How long a worker waits for a message before re-checking for `close`.
    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> QueueResult<()> {
        if self.is_closed() {
            Err(QueueError::Closed)
        } else {
            Ok(())
        }
    }

    pub async fn publish<T>(&self, queue: &str, message: &T) -> QueueResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_open()?;
        let payload = serde_json::to_string(message)?;

        self.client.declare(queue).await?;
        self.client.push(queue, &payload).await
    }

    pub async fn subscribe<T, F, Fut>(&self, queue: &str, handler: F) -> QueueResult<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.ensure_open()?;
        self.client.declare(queue).await?;

        let worker = Worker {
            client: self.client.clone(),
            queue: queue.to_string(),
            closed: self.closed.clone(),
            poll: self.poll,
        };

        let handle = tokio::spawn(worker.run(handler));
        self.workers.lock().await.push(handle);

        tracing::info!(queue = %queue, backend = self.client.backend_name(), "subscribed");
        Ok(())
    }

    /// Stop all workers and wait for in-progress messages to settle.
    pub async fn close(&self) -> QueueResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let workers = std::mem::take(&mut *self.workers.lock().await);
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "queue worker ended abnormally");
            }
        }

        tracing::info!(backend = self.client.backend_name(), "queue bus closed");
        Ok(())
    }
}

struct Worker<C> {
    client: C,
    queue: String,
    closed: Arc<AtomicBool>,
    poll: Duration,
}

enum Settle {
    Ack,
    DeadLetter,
}

impl<C: QueueClient> Worker<C> {
    async fn run<T, F, Fut>(self, handler: F)
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        while !self.closed.load(Ordering::SeqCst) {
            let delivery = match self.client.reserve(&self.queue, self.poll).await {
                Ok(Some(delivery)) => delivery,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(queue = %self.queue, error = %e, "failed to reserve message");
                    tokio::time::sleep(self.poll).await;
                    continue;
                }
            };

            let outcome = self.process(&delivery, &handler).await;
            self.settle(&delivery, outcome).await;
        }
    }

    async fn process<T, F, Fut>(&self, delivery: &Delivery, handler: &F) -> Settle
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let message: T = match serde_json::from_str(&delivery.payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(queue = %self.queue, error = %e, "undecodable message");
                return Settle::DeadLetter;
            }
        };

        // Own task so a panicking handler doesn't take the worker down.
        match tokio::spawn(handler(message)).await {
            Ok(Ok(())) => Settle::Ack,
            Ok(Err(e)) => {
                tracing::error!(queue = %self.queue, error = ?e, "error processing message");
                Settle::DeadLetter
            }
            Err(e) => {
                tracing::error!(queue = %self.queue, error = %e, "message handler panicked");
                Settle::DeadLetter
            }
        }
    }

    async fn settle(&self, delivery: &Delivery, outcome: Settle) {
        let result = match outcome {
            Settle::Ack => self.client.ack(delivery).await,
            Settle::DeadLetter => self.client.dead_letter(delivery).await,
        };

        if let Err(e) = result {
            tracing::warn!(queue = %self.queue, error = %e, "failed to settle message");
        }
    }
}
