//! API route handlers
//!
//! - Puller calculation and form reset
//! - Health and active configuration

mod calculate;
mod status;

pub use calculate::*;
pub use status::*;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::PressConfig;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers. Immutable after startup.
#[derive(Clone)]
pub struct ApiState {
    /// Press parameters and server settings
    pub config: Arc<PressConfig>,
    /// Process start time, for uptime reporting
    pub started_at: DateTime<Utc>,
}

impl ApiState {
    pub fn new(config: PressConfig) -> Self {
        Self {
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::{Form, Json};

    fn create_test_state() -> ApiState {
        ApiState::new(PressConfig::default())
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check(State(create_test_state())).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.press, "DEFAULT");
        assert!(response.uptime_seconds >= 0);
    }

    #[tokio::test]
    async fn test_get_config_returns_defaults() {
        let response = get_config(State(create_test_state())).await;
        assert_eq!(response.parameters.max_force_kgf, 190.0);
    }

    #[tokio::test]
    async fn test_calculate_success() {
        let pairs: Vec<(String, String)> = [("ratio", "10"), ("run_out", "0"), ("setpoint", "5"), ("cavities", "2")]
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let Json(response) = calculate(State(create_test_state()), Some(Form(pairs))).await;
        match response {
            CalculateResponse::Ok(out) => {
                assert_eq!(out.puller_force, 82);
                assert_eq!(out.burp_psi, 1015);
            }
            CalculateResponse::Error { error } => panic!("unexpected error: {error}"),
        }
    }

    #[tokio::test]
    async fn test_calculate_without_form() {
        let Json(response) = calculate(State(create_test_state()), None).await;
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Ratio is required"}));
    }

    #[tokio::test]
    async fn test_clear_is_empty_object() {
        let Json(value) = clear().await;
        assert_eq!(value, serde_json::json!({}));
    }
}
