pub mod routes;

use std::net::SocketAddr;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use common::Result;

/// Read-only state for the liveness routes. Nothing here is shared with
/// the scanner.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::health_router())
        .with_state(state)
        .layer(cors)
}

/// Bind `0.0.0.0:port` and serve the liveness routes until the process exits.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Liveness endpoint listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
