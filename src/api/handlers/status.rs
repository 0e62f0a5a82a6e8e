//! Health and configuration endpoints

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use super::ApiState;
use crate::config::PressConfig;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub press: String,
    /// RFC 3339 start time
    pub started_at: String,
    pub uptime_seconds: i64,
}

/// GET /health - Liveness check with uptime
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.started_at);
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        press: state.config.press.name.clone(),
        started_at: state.started_at.to_rfc3339(),
        uptime_seconds: uptime.num_seconds().max(0),
    })
}

/// GET /config - Return the active press configuration
///
/// Read-only: the parameters are fixed for the life of the process.
pub async fn get_config(State(state): State<ApiState>) -> Json<PressConfig> {
    Json(state.config.as_ref().clone())
}
