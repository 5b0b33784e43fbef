/*
 * Responsibility
 * - Orders の request DTO / キューに流すイベント
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<String>,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.items.is_empty() {
            return Err("items must not be empty");
        }
        if self.items.iter().any(|i| i.trim().is_empty()) {
            return Err("items must not contain blank names");
        }
        Ok(())
    }
}

/// Published to [`ORDER_CREATED_QUEUE`] for the kitchen / billing services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub placed_by: String,
    pub items: Vec<String>,
    pub placed_at: chrono::DateTime<chrono::Utc>,
}

pub const ORDER_CREATED_QUEUE: &str = "orders.created";
