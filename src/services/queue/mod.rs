pub mod bus;
pub mod client;
pub mod memory;
pub mod valkey;

pub use bus::QueueBus;
pub use client::{Delivery, QueueClient, QueueError, QueueResult};
pub use memory::MemoryQueue;
pub use valkey::ValkeyQueue;
