//! Health and heartbeat routes.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::dashboard::state::AppState;

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mailchimp_ready": state.mailchimp_ready(),
    }))
}

/// POST /api/heartbeat
///
/// The page pings this while it is open; the watchdog stops the server once
/// the pings stop.
pub async fn heartbeat(State(state): State<Arc<AppState>>) -> StatusCode {
    state.heartbeat.beat().await;
    StatusCode::NO_CONTENT
}

/// POST /api/heartbeat/close
///
/// Sent as a beacon on `pagehide`. A reload beats again within the grace
/// period and keeps the server running.
pub async fn heartbeat_close(State(state): State<Arc<AppState>>) -> StatusCode {
    state.heartbeat.close().await;
    StatusCode::NO_CONTENT
}
