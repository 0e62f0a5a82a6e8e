//! Press Configuration Module
//!
//! Operator-tunable press parameters and server settings loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `PULLER_CONFIG` environment variable (path to TOML file)
//! 2. `press_config.toml` in the current working directory
//! 3. Built-in defaults (the press constants the calculator was tuned with)
//!
//! The loaded config is handed to the HTTP state at startup and shared
//! behind an `Arc`.

mod press_config;
pub mod defaults;
pub mod validation;

pub use press_config::*;
