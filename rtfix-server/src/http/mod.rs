//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::AppState;
use crate::ws::ws_handler;

pub use api::{EndpointSummary, HealthResponse};

/// Create the router: the health API plus one WebSocket route serving every
/// registered endpoint path
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/{*path}", get(ws_handler))
        .with_state(state)
}
