/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - tracing / panic hook の初期化
 * - axum::serve() で起動、Ctrl-C でキューを閉じて終了
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::dto::orders::{ORDER_CREATED_QUEUE, OrderCreated};
use crate::config::Config;
use crate::middleware;
use crate::services::auth::build_auth_service;
use crate::services::queue::QueueBus;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,good_food_utils=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gate demo in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state.clone(), &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(queue) = &state.queue {
        queue.close().await?;
    }

    Ok(())
}

pub async fn build_state(config: &Config) -> Result<AppState> {
    let auth = build_auth_service(config);

    let queue = match &config.queue_url {
        Some(url) => {
            let bus = QueueBus::connect(url.as_str()).await?;
            bus.subscribe(ORDER_CREATED_QUEUE, |order: OrderCreated| async move {
                tracing::info!(
                    placed_by = %order.placed_by,
                    items = order.items.len(),
                    "order received"
                );
                Ok::<(), anyhow::Error>(())
            })
            .await?;
            Some(Arc::new(bus))
        }
        None => None,
    };

    Ok(AppState::new(auth, queue))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(api::v1::handlers::health::health))
        .nest("/api/v1", api::v1::routes(&state))
        .with_state(state);

    middleware::http::apply(
        router,
        Duration::from_secs(config.request_timeout_seconds),
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
