//! JSON HTTP surface over the order and menu clients.

use std::future::Future;
use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::{self, ctrl_c};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::clients::{MenuClient, OrderClient};

pub mod dto;
pub mod error;
pub mod menu;
pub mod orders;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderClient,
    pub menu: MenuClient,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(|| async { "Coffee Shop API is running!" }))
        .route("/api/menu/items", get(menu::list_items).post(menu::create_item))
        .route(
            "/api/menu/items/{id}",
            get(menu::get_item).put(menu::update_item).delete(menu::delete_item),
        )
        .route("/api/menu/category/{category}", get(menu::items_by_category))
        .route("/api/orders", get(orders::list_orders).post(orders::create_order))
        .route("/api/orders/board", get(orders::board))
        .route("/api/orders/reset", post(orders::reset))
        .route("/api/orders/status/{status}", get(orders::orders_by_status))
        .route("/api/orders/{id}", get(orders::get_order).delete(orders::delete_order))
        .route("/api/orders/{id}/status", patch(orders::update_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves `state` on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let address = listener.local_addr()?;
    info!("Server running on http://{address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
