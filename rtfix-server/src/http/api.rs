//! REST API handlers

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// One row of the endpoint table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointSummary {
    /// Mount path
    pub path: String,
    /// Scenario kind, e.g. `server_closes_delayed`
    pub scenario: String,
    /// `basic` or `enhanced`
    pub variant: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
    /// Registered endpoints, ordered by path
    pub endpoints: Vec<EndpointSummary>,
}

/// Health check endpoint
///
/// Returns server status, version, uptime, and the endpoint table.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let endpoints = state
        .registry
        .endpoints()
        .map(|endpoint| EndpointSummary {
            path: endpoint.path().to_string(),
            scenario: endpoint.scenario().kind().to_string(),
            variant: endpoint.variant().to_string(),
        })
        .collect();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        endpoints,
    })
}
