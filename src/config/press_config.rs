//! Press Configuration - calculator constants as operator-tunable TOML values
//!
//! Every press constant the calculator uses is a field here. Each struct
//! implements `Default` with the values the press was commissioned with, so
//! an absent or partial file changes nothing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one press deployment.
///
/// Load with `PressConfig::load()` which searches:
/// 1. `$PULLER_CONFIG` env var
/// 2. `./press_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PressConfig {
    /// Press identification
    #[serde(default)]
    pub press: PressInfo,

    /// Calculator constants
    #[serde(default)]
    pub parameters: PressParameters,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl PressConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults when a file is missing or broken.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), press = %config.press.name, "Loaded press config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load press config, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(defaults::DEFAULT_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(press = %config.press.name, "Loaded press config from ./{}", defaults::DEFAULT_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::DEFAULT_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", defaults::DEFAULT_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and otherwise ignored.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve the bind address: `$PULLER_SERVER_ADDR` beats the file value.
    pub fn server_addr(&self) -> String {
        std::env::var(defaults::SERVER_ADDR_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.server.addr.clone())
    }

    /// Validate the press parameters for internal consistency.
    ///
    /// Rules:
    /// - Every value must be finite
    /// - Areas, factors, speeds and forces used as divisors must be positive
    /// - Ratio bounds must satisfy 0 < min < max (their logs are divided by)
    /// - Ramp bounds must satisfy min < max
    /// - The seeded force estimate must lie in (0, max_force]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.parameters;
        let mut errors: Vec<String> = Vec::new();

        for (name, value) in p.named_values() {
            if !value.is_finite() {
                errors.push(format!("parameters.{name} must be finite (got {value})"));
            }
        }

        Self::check_positive(p.billet_area_m2, "billet_area_m2", &mut errors);
        Self::check_positive(p.speed_factor, "speed_factor", &mut errors);
        Self::check_positive(p.max_speed_m_min, "max_speed_m_min", &mut errors);
        Self::check_positive(p.max_force_kgf, "max_force_kgf", &mut errors);
        Self::check_positive(p.profile_speed_divisor, "profile_speed_divisor", &mut errors);
        Self::check_positive(p.ratio_min, "ratio_min", &mut errors);

        if p.ratio_max <= p.ratio_min {
            errors.push(format!(
                "parameters.ratio_max ({:.2}) must be greater than ratio_min ({:.2})",
                p.ratio_max, p.ratio_min
            ));
        }
        if p.ramp_max <= p.ramp_min {
            errors.push(format!(
                "parameters.ramp_max ({:.2}) must be greater than ramp_min ({:.2})",
                p.ramp_max, p.ramp_min
            ));
        }
        if p.ramp_min <= 0.0 {
            errors.push("parameters.ramp_min must be > 0 (ramp time is a divisor)".to_string());
        }
        if p.initial_puller_force_kgf <= 0.0 || p.initial_puller_force_kgf > p.max_force_kgf {
            errors.push(format!(
                "parameters.initial_puller_force_kgf ({:.1}) must be within (0, max_force_kgf = {:.1}]",
                p.initial_puller_force_kgf, p.max_force_kgf
            ));
        }
        if p.k_force_high_kgf < p.k_force_low_kgf {
            errors.push(format!(
                "parameters.k_force_high_kgf ({:.1}) must be >= k_force_low_kgf ({:.1})",
                p.k_force_high_kgf, p.k_force_low_kgf
            ));
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        if value <= 0.0 {
            errors.push(format!("parameters.{name} must be > 0 (got {value})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Press Info
// ============================================================================

/// Identification metadata. Appears in logs and `/config`, not in the math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressInfo {
    #[serde(default = "default_press_name")]
    pub name: String,

    /// Extrusion line the press belongs to
    #[serde(default)]
    pub line: String,
}

fn default_press_name() -> String {
    "DEFAULT".to_string()
}

impl Default for PressInfo {
    fn default() -> Self {
        Self {
            name: default_press_name(),
            line: String::new(),
        }
    }
}

// ============================================================================
// Press Parameters
// ============================================================================

/// Constants of the puller force and ramp model.
///
/// Changing any of these changes every calculated value. The defaults
/// reproduce the commissioning numbers exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressParameters {
    /// Billet cross-section (m²). 78.54 in² converted.
    #[serde(default = "default_billet_area")]
    pub billet_area_m2: f64,

    /// Puller speed fraction applied to the base force.
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f64,

    /// Draw ratio mapped to the bottom of the ramp / k interpolation.
    #[serde(default = "default_ratio_min")]
    pub ratio_min: f64,

    /// Draw ratio mapped to the top of the ramp / k interpolation.
    #[serde(default = "default_ratio_max")]
    pub ratio_max: f64,

    /// Lowest ramp input (1 = 0.1 s).
    #[serde(default = "default_ramp_min")]
    pub ramp_min: f64,

    /// Highest ramp input (100 = 10 s).
    #[serde(default = "default_ramp_max")]
    pub ramp_max: f64,

    /// Press maximum profile speed (m/min).
    #[serde(default = "default_max_speed")]
    pub max_speed_m_min: f64,

    /// Hard cap on puller force (kgf). Machine safety limit.
    #[serde(default = "default_max_force")]
    pub max_force_kgf: f64,

    /// Run-out scaling per unit run-out per cavity.
    #[serde(default = "default_run_out_factor")]
    pub run_out_factor: f64,

    /// Torque at rest.
    #[serde(default = "default_base_torque_factor")]
    pub base_torque_factor: f64,

    /// Torque added per unit of force x speed x acceleration.
    #[serde(default = "default_accel_torque_factor")]
    pub accel_torque_factor: f64,

    /// Force estimate seeding the first ramp pass (kgf).
    #[serde(default = "default_initial_puller_force")]
    pub initial_puller_force_kgf: f64,

    /// Puller force at the low end of the ratio range (kgf).
    #[serde(default = "default_k_force_low")]
    pub k_force_low_kgf: f64,

    /// Puller force at the high end of the ratio range (kgf).
    #[serde(default = "default_k_force_high")]
    pub k_force_high_kgf: f64,

    /// Set speed per percent of profile speed (m/min).
    #[serde(default = "default_profile_speed_divisor")]
    pub profile_speed_divisor: f64,
}

fn default_billet_area() -> f64 { 0.0507 }
fn default_speed_factor() -> f64 { 0.69 }
fn default_ratio_min() -> f64 { 5.0 }
fn default_ratio_max() -> f64 { 100.0 }
fn default_ramp_min() -> f64 { 1.0 }
fn default_ramp_max() -> f64 { 100.0 }
fn default_max_speed() -> f64 { 13.0 }
fn default_max_force() -> f64 { 190.0 }
fn default_run_out_factor() -> f64 { 0.0015 }
fn default_base_torque_factor() -> f64 { 0.1 }
fn default_accel_torque_factor() -> f64 { 0.1 }
fn default_initial_puller_force() -> f64 { 164.0 }
fn default_k_force_low() -> f64 { 50.0 }
fn default_k_force_high() -> f64 { 190.0 }
fn default_profile_speed_divisor() -> f64 { 0.13 }

impl Default for PressParameters {
    fn default() -> Self {
        Self {
            billet_area_m2: default_billet_area(),
            speed_factor: default_speed_factor(),
            ratio_min: default_ratio_min(),
            ratio_max: default_ratio_max(),
            ramp_min: default_ramp_min(),
            ramp_max: default_ramp_max(),
            max_speed_m_min: default_max_speed(),
            max_force_kgf: default_max_force(),
            run_out_factor: default_run_out_factor(),
            base_torque_factor: default_base_torque_factor(),
            accel_torque_factor: default_accel_torque_factor(),
            initial_puller_force_kgf: default_initial_puller_force(),
            k_force_low_kgf: default_k_force_low(),
            k_force_high_kgf: default_k_force_high(),
            profile_speed_divisor: default_profile_speed_divisor(),
        }
    }
}

impl PressParameters {
    /// All fields with their TOML names, for blanket checks.
    pub fn named_values(&self) -> [(&'static str, f64); 15] {
        [
            ("billet_area_m2", self.billet_area_m2),
            ("speed_factor", self.speed_factor),
            ("ratio_min", self.ratio_min),
            ("ratio_max", self.ratio_max),
            ("ramp_min", self.ramp_min),
            ("ramp_max", self.ramp_max),
            ("max_speed_m_min", self.max_speed_m_min),
            ("max_force_kgf", self.max_force_kgf),
            ("run_out_factor", self.run_out_factor),
            ("base_torque_factor", self.base_torque_factor),
            ("accel_torque_factor", self.accel_torque_factor),
            ("initial_puller_force_kgf", self.initial_puller_force_kgf),
            ("k_force_low_kgf", self.k_force_low_kgf),
            ("k_force_high_kgf", self.k_force_high_kgf),
            ("profile_speed_divisor", self.profile_speed_divisor),
        ]
    }
}

// ============================================================================
// Server Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, `HOST:PORT`
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}
