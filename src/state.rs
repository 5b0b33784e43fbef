/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::services::auth::AuthService;
use crate::services::queue::{QueueBus, ValkeyQueue};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    // None when QUEUE_URL is not configured
    pub queue: Option<Arc<QueueBus<ValkeyQueue>>>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, queue: Option<Arc<QueueBus<ValkeyQueue>>>) -> Self {
        Self { auth, queue }
    }
}
