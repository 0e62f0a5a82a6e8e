//! Calculator inputs, outputs and the intermediate report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest cavities a die can have.
pub const MIN_CAVITIES: i64 = 1;

/// Most cavities the press supports.
pub const MAX_CAVITIES: i64 = 4;

// ============================================================================
// Input
// ============================================================================

/// Validated operator input for one puller calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Draw ratio (billet area / profile area). Must be finite and > 0.
    pub ratio: f64,
    /// Run-out deviation per cavity.
    pub run_out: f64,
    /// Puller set speed (m/min).
    pub set_speed: f64,
    /// Die cavity count, always within [1, 4].
    pub cavities: u8,
}

impl CalculationInput {
    /// Build an input with default run-out, set speed and cavity count.
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio,
            run_out: 0.0,
            set_speed: 0.0,
            cavities: 1,
        }
    }

    pub fn with_run_out(mut self, run_out: f64) -> Self {
        self.run_out = run_out;
        self
    }

    pub fn with_set_speed(mut self, set_speed: f64) -> Self {
        self.set_speed = set_speed;
        self
    }

    /// Set the cavity count, clamped to the supported range.
    pub fn with_cavities(mut self, cavities: i64) -> Self {
        self.cavities = clamp_cavities(cavities);
        self
    }
}

/// Clamp a requested cavity count into [1, 4].
pub fn clamp_cavities(requested: i64) -> u8 {
    // Bounded by MAX_CAVITIES so the narrowing cast cannot truncate.
    requested.clamp(MIN_CAVITIES, MAX_CAVITIES) as u8
}

// ============================================================================
// Output
// ============================================================================

/// Values returned to the operator. Field names are the JSON wire keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOutput {
    /// Truncated percent of max speed with the raw set speed, e.g. `38% (5.0)`.
    pub profile_speed: String,
    /// Ramp code and ramp seconds, e.g. `27 (2.7s)`.
    pub torque_ramp: String,
    /// Rounded puller force (kgf).
    pub puller_force: i64,
    /// Truncated burp pressure (psi).
    pub burp_psi: i64,
}

/// Every intermediate value of one calculation.
///
/// The provisional fields come from the seeded force estimate; the final
/// fields from the corrected pass. Torque never reaches the HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullerReport {
    pub input: CalculationInput,
    pub ln_ratio: f64,
    /// Position of the ratio between the configured ratio bounds (log scale).
    pub ratio_interpolation: f64,
    pub burp_psi: f64,
    pub burp_pa: f64,
    /// Extruded profile area (m²).
    pub extruded_area_m2: f64,
    pub profile_speed_percent: f64,

    pub provisional_ramp_input: f64,
    pub provisional_ramp_seconds: f64,
    pub provisional_torque: f64,

    pub base_force_n: f64,
    pub base_force_kgf: f64,
    pub k_factor: f64,
    pub puller_force_base: f64,
    /// Force after run-out scaling, before the machine cap.
    pub puller_force_total: f64,
    pub puller_force_final: f64,

    pub ramp_input: f64,
    pub ramp_seconds: f64,
    pub torque: f64,
}

// ============================================================================
// Errors
// ============================================================================

/// Calculation failures. `Display` is the operator-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("Ratio is required")]
    MissingRatio,

    #[error("Invalid input. Please enter numeric values.")]
    InvalidInput { field: String, value: String },

    #[error("Calculation error: {0}")]
    Calculation(String),
}

impl CalculationError {
    pub fn invalid(field: &str, value: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            value: value.into(),
        }
    }
}
