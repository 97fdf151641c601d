use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::AppState;

/// Body returned by `GET /`.
pub const BANNER: &str = "Binary + Forex bot running ✅";

pub fn health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
}

/// Static liveness response polled by the hosting platform.
async fn root() -> &'static str {
    BANNER
}

async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0);
    Json(json!({
        "status": "ok",
        "uptime_seconds": uptime,
    }))
}
