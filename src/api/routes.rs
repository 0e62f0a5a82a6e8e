//! API route definitions
//!
//! - POST /calculate - puller calculation from form fields
//! - POST /clear - form reset acknowledgement
//! - GET /health - liveness and uptime
//! - GET /config - active press configuration

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Create all API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/calculate", post(handlers::calculate))
        .route("/clear", post(handlers::clear))
        .route("/health", get(handlers::health_check))
        .route("/config", get(handlers::get_config))
        .with_state(state)
}
