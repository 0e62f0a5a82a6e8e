//! System-wide default constants.
//!
//! Press tuning defaults live on `PressParameters`; this module holds the
//! process-level settings and the physical constants that never change.

// ============================================================================
// Physical Constants
// ============================================================================

/// Pascals per psi.
pub const PSI_TO_PA: f64 = 6894.76;

/// Newtons per kilogram-force.
pub const GRAVITY: f64 = 9.81;

/// Billet cross-section in square inches (the source of the 0.0507 m² default).
pub const BILLET_AREA_IN2: f64 = 78.54;

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PULLER_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "press_config.toml";

// ============================================================================
// HTTP Server
// ============================================================================

/// Bind address when neither config, env nor CLI sets one.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:5000";

/// Environment override for the bind address.
pub const SERVER_ADDR_ENV_VAR: &str = "PULLER_SERVER_ADDR";

/// Comma-separated list of origins allowed cross-origin access.
pub const CORS_ORIGINS_ENV_VAR: &str = "PULLER_CORS_ORIGINS";

/// Largest accepted request body. Form submissions are a few dozen bytes.
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;
