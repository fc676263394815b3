//! Local editor dashboard
//!
//! Axum app serving a single-page email editor on `127.0.0.1:8050`.
//!
//! # Endpoints
//!
//! ## Editor
//! - `GET /` - Editor page
//! - `GET /api/defaults` - Default config, show and Mailchimp readiness
//! - `POST /api/parse/config` - Uploaded theatre YAML to JSON
//! - `POST /api/parse/show` - Uploaded show JSON, normalized
//! - `POST /api/preview` - Render with a light/dark preview override
//! - `POST /api/export` - Download `email.html`
//!
//! ## Mailchimp
//! - `POST /api/send` - Create a draft and send it now
//! - `POST /api/schedule` - Create a draft and schedule it
//! - `GET /api/campaigns/scheduled` - Scheduled campaigns
//! - `POST /api/campaigns/:id/unschedule` - Back to draft
//! - `GET /api/campaigns/sent` - Sent archive, optional `since`/`until`
//! - `GET /api/campaigns/:id/content` - Stored campaign HTML
//!
//! ## System
//! - `GET /health`
//! - `POST /api/heartbeat` - Keeps the server alive while the page is open
//! - `POST /api/heartbeat/close` - Page is going away

pub mod error;
pub mod form;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, Defaults, Heartbeat, Pulse};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;

/// Build the dashboard router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/defaults", get(routes::editor::defaults))
        .route("/parse/config", post(routes::editor::parse_config))
        .route("/parse/show", post(routes::editor::parse_show))
        .route("/preview", post(routes::editor::preview))
        .route("/export", post(routes::editor::export))
        .route("/send", post(routes::campaigns::send))
        .route("/schedule", post(routes::campaigns::schedule))
        .route("/campaigns/scheduled", get(routes::campaigns::list_scheduled))
        .route("/campaigns/sent", get(routes::campaigns::list_sent))
        .route("/campaigns/:id/unschedule", post(routes::campaigns::unschedule))
        .route("/campaigns/:id/content", get(routes::campaigns::content))
        .route("/heartbeat", post(routes::system::heartbeat))
        .route("/heartbeat/close", post(routes::system::heartbeat_close));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::editor::index))
        .route("/health", get(routes::system::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the dashboard and block until shutdown.
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.addr();
    let heartbeat = Arc::clone(&state.heartbeat);
    let timeout = Duration::from_secs(state.config.heartbeat_timeout_seconds);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🎭 Dashboard listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(heartbeat, timeout))
        .await?;

    tracing::info!("Dashboard shut down gracefully");
    Ok(())
}

/// Wait after a close report before stopping, so a reload can beat again.
pub const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Nothing stops before the first heartbeat. After that the server stops
/// once the page reported closing and [`CLOSE_GRACE`] passed without a new
/// beat, or once the latest beat is older than `timeout`.
pub fn should_shutdown(pulse: Pulse, now: Instant, timeout: Duration) -> bool {
    let Some(last) = pulse.last_beat else {
        return false;
    };
    if let Some(closed) = pulse.closed_at {
        if now.saturating_duration_since(closed) > CLOSE_GRACE {
            return true;
        }
    }
    now.saturating_duration_since(last) > timeout
}

/// Resolves when the editor page stops sending heartbeats.
pub async fn heartbeat_watchdog(heartbeat: Arc<Heartbeat>, timeout: Duration) {
    let poll = (timeout / 3).clamp(Duration::from_secs(1), CLOSE_GRACE);
    loop {
        tokio::time::sleep(poll).await;
        let pulse = heartbeat.pulse().await;
        if should_shutdown(pulse, Instant::now(), timeout) {
            if pulse.closed_at.is_some() {
                tracing::info!("Editor page closed");
            } else {
                tracing::info!("No heartbeat for {:?}; editor page gone", timeout);
            }
            return;
        }
    }
}

/// Wait for Ctrl+C, SIGTERM or the heartbeat watchdog
async fn shutdown_signal(heartbeat: Arc<Heartbeat>, timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = heartbeat_watchdog(heartbeat, timeout) => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
