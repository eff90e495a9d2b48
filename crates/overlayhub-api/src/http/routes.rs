//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::http::handlers;
use crate::state::AppState;
use crate::websocket::ws_handler;

/// Build the router.
///
/// ```text
/// GET  /api/status      - Hub status
/// POST /api/command     - Submit a command
/// GET  /api/history     - Recent commands (?limit=N)
/// GET  /api/schemas     - Command catalog
/// POST /api/analyze     - Analyse a screenshot
/// GET  /api/extensions  - Loaded extensions
/// GET  /api/peers       - Connected peers
///
/// GET  /ws              - WebSocket connection
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/status", get(handlers::status))
        .route("/command", post(handlers::submit))
        .route("/history", get(handlers::history))
        .route("/schemas", get(handlers::schemas))
        .route("/analyze", post(handlers::analyze))
        .route("/extensions", get(handlers::extensions))
        .route("/peers", get(handlers::peers))
        .with_state(state.clone());

    let ws_route = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_route)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
