//! puller-calc: Extrusion Press Puller Calculator
//!
//! Computes puller force, torque ramp, burp pressure and profile speed for
//! an aluminium extrusion press from the die draw ratio, run-out, puller set
//! speed and cavity count.
//!
//! ## Architecture
//!
//! - **Physics Engine**: closed-form puller model (two-pass force/ramp)
//! - **Config**: press constants and server settings from TOML
//! - **API**: axum router answering HMI form submissions with JSON

pub mod api;
pub mod config;
pub mod physics_engine;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, PressConfig, PressParameters};

// Re-export commonly used types
pub use types::{CalculationError, CalculationInput, CalculationOutput, PullerReport};

// Re-export calculator entry points
pub use physics_engine::{compute, compute_report};
