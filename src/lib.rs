use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod session;

use session::SessionStore;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: config::AppConfig,
    /// Every browser session's URL collection. Nothing here outlives the process.
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: config::AppConfig) -> Self {
        let sessions = SessionStore::new(config.session_duration_hours, config.max_sessions);
        Self { config, sessions }
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // The single UI page, rendering whichever view is active
        .route("/", get(handlers::ui::index))
        // View switch buttons
        .route("/view/:page", post(handlers::ui::show))
        // Shortening form
        .route("/links", post(handlers::ui::create_link))
        // Clicking a short URL
        .route("/visit", post(handlers::visit::visit))
        .route("/health", get(|| async { StatusCode::OK }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
