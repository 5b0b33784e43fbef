/*
 * Responsibility
 * - POST /orders (CUSTOMER / STAFF)
 * - 受け付けたら orders.created キューへ publish（キュー未設定ならログのみ）
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::api::v1::dto::orders::{CreateOrderRequest, ORDER_CREATED_QUEUE, OrderCreated};
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreated>), (StatusCode, &'static str)> {
    req.validate()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let event = OrderCreated {
        placed_by: user.subject().to_string(),
        items: req.items,
        placed_at: chrono::Utc::now(),
    };

    match &state.queue {
        Some(queue) => queue
            .publish(ORDER_CREATED_QUEUE, &event)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to publish order");
                (StatusCode::SERVICE_UNAVAILABLE, "order queue unavailable")
            })?,
        None => tracing::info!(sub = %event.placed_by, "queue not configured; order not published"),
    }

    Ok((StatusCode::ACCEPTED, Json(event)))
}
