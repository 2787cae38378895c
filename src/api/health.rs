//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::dispatch::DispatcherStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Names of the hosts webhooks are accepted for
    pub hosts: Vec<String>,
    pub destinations: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.dispatcher.registry();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        hosts: registry.enabled_hosts(),
        destinations: registry.destinations().len(),
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<DispatcherStatsSnapshot> {
    Json(state.dispatcher.stats())
}
