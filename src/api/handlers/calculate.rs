//! Calculator endpoints

use axum::extract::State;
use axum::Form;
use axum::Json;
use serde::Serialize;
use tracing::{error, info, warn};

use super::ApiState;
use crate::physics_engine;
use crate::types::{clamp_cavities, CalculationError, CalculationInput, CalculationOutput};

// ============================================================================
// Form Parsing
// ============================================================================

/// Raw form fields as submitted by the press HMI page.
///
/// Every field stays a string until parsed so that absent, blank and
/// malformed values can be told apart.
#[derive(Debug, Default)]
pub struct CalculateForm {
    pub ratio: Option<String>,
    pub run_out: Option<String>,
    pub setpoint: Option<String>,
    pub cavities: Option<String>,
}

impl CalculateForm {
    /// Collect the known fields from decoded form pairs.
    ///
    /// A repeated field keeps its first value; unknown fields are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "ratio" => &mut form.ratio,
                "run_out" => &mut form.run_out,
                "setpoint" => &mut form.setpoint,
                "cavities" => &mut form.cavities,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        form
    }

    /// Parse into a calculator input.
    ///
    /// - `ratio` absent or blank: `MissingRatio`
    /// - optional field absent: its default (0.0, 0.0, 1 cavity)
    /// - field present but not a number (blank included): `InvalidInput`
    /// - `run_out` / `setpoint` accept `inf` and `nan` like any other float
    /// - `cavities` non-integer: truncated toward zero, then clamped to [1, 4]
    pub fn into_input(self) -> Result<CalculationInput, CalculationError> {
        let ratio = match self.ratio.as_deref().map(str::trim) {
            None | Some("") => return Err(CalculationError::MissingRatio),
            Some(raw) => parse_number("ratio", raw)?,
        };

        let run_out = parse_optional("run_out", self.run_out.as_deref(), 0.0)?;
        let set_speed = parse_optional("setpoint", self.setpoint.as_deref(), 0.0)?;
        let cavities = match self.cavities.as_deref() {
            None => 1,
            Some(raw) => parse_cavities(raw)?,
        };

        Ok(CalculationInput {
            ratio,
            run_out,
            set_speed,
            cavities,
        })
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64, CalculationError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CalculationError::invalid(field, raw))
}

fn parse_optional(field: &str, raw: Option<&str>, default: f64) -> Result<f64, CalculationError> {
    raw.map_or(Ok(default), |r| parse_number(field, r))
}

fn parse_cavities(raw: &str) -> Result<u8, CalculationError> {
    let trimmed = raw.trim();
    if let Ok(count) = trimmed.parse::<i64>() {
        return Ok(clamp_cavities(count));
    }
    let value = parse_number("cavities", trimmed)?;
    if !value.is_finite() {
        return Err(CalculationError::invalid("cavities", raw));
    }
    // Saturating float-to-int cast; the clamp makes saturation harmless.
    Ok(clamp_cavities(value.trunc() as i64))
}

// ============================================================================
// Handlers
// ============================================================================

/// Either the four calculated values or `{"error": "..."}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CalculateResponse {
    Ok(CalculationOutput),
    Error { error: String },
}

/// POST /calculate - Run the puller calculation on a form submission
///
/// Always answers 200; failures are reported through the `error` key, which
/// is what the HMI page inspects. A body that is not form-encoded is treated
/// as an empty form.
pub async fn calculate(
    State(state): State<ApiState>,
    form: Option<Form<Vec<(String, String)>>>,
) -> Json<CalculateResponse> {
    let form = match form {
        Some(Form(pairs)) => CalculateForm::from_pairs(pairs),
        None => {
            warn!("Request body is not a urlencoded form, treating as empty");
            CalculateForm::default()
        }
    };

    let result = form
        .into_input()
        .and_then(|input| physics_engine::compute(&input, &state.config.parameters).map(|out| (input, out)));

    match result {
        Ok((input, output)) => {
            info!(
                ratio = input.ratio,
                set_speed = input.set_speed,
                cavities = input.cavities,
                puller_force = output.puller_force,
                torque_ramp = %output.torque_ramp,
                "Calculated puller settings"
            );
            Json(CalculateResponse::Ok(output))
        }
        Err(e) => {
            match &e {
                CalculationError::MissingRatio => warn!("Calculation rejected: ratio missing"),
                CalculationError::InvalidInput { field, value } => {
                    warn!(field = %field, value = %value, "Calculation rejected: invalid input");
                }
                CalculationError::Calculation(cause) => {
                    error!(cause = %cause, "Calculation failed");
                }
            }
            Json(CalculateResponse::Error {
                error: e.to_string(),
            })
        }
    }
}

/// POST /clear - Acknowledge a form reset. No server-side state exists.
pub async fn clear() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}
