//! puller-calc - Extrusion Press Puller Calculator
//!
//! HTTP service (and one-shot CLI) computing puller settings for an
//! extrusion press.
//!
//! # Usage
//!
//! ```bash
//! # Serve the calculator API (default 0.0.0.0:5000)
//! cargo run --release
//!
//! # One calculation, printed as JSON
//! puller-calc calc --ratio 10 --setpoint 5 --cavities 2
//!
//! # Every intermediate value
//! puller-calc calc --ratio 10 --setpoint 5 --detail
//!
//! # Validate a config file
//! puller-calc --config press_config.toml check-config
//! ```
//!
//! # Environment Variables
//!
//! - `PULLER_CONFIG`: Path to the press config TOML
//! - `PULLER_SERVER_ADDR`: Bind address override
//! - `PULLER_CORS_ORIGINS`: Comma-separated origins allowed cross-origin
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use puller_calc::api::{create_app, ApiState};
use puller_calc::config::PressConfig;
use puller_calc::physics_engine;
use puller_calc::types::CalculationInput;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "puller-calc")]
#[command(about = "Extrusion press puller force and ramp calculator")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: from config, "0.0.0.0:5000")
    #[arg(short, long, global = true)]
    addr: Option<String>,

    /// Path to the press config TOML (skips the PULLER_CONFIG / ./press_config.toml search)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Serve the calculator HTTP API (default)
    Serve,

    /// Run one calculation and print the result as JSON
    Calc {
        /// Draw ratio (billet area / profile area)
        #[arg(long)]
        ratio: f64,
        /// Run-out per cavity
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        run_out: f64,
        /// Puller set speed (m/min)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        setpoint: f64,
        /// Die cavities, clamped to 1-4
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        cavities: i64,
        /// Print every intermediate value instead of the operator values
        #[arg(long)]
        detail: bool,
    },

    /// Load and validate the press config, then print it as TOML
    CheckConfig,
}

// ============================================================================
// Configuration
// ============================================================================

/// Explicit path: failures are fatal. Otherwise search with fallback to defaults.
fn load_config(path: Option<&PathBuf>) -> Result<PressConfig> {
    match path {
        Some(p) => PressConfig::load_from_file(p)
            .with_context(|| format!("Failed to load press config from {}", p.display())),
        None => Ok(PressConfig::load()),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn run_calc(config: &PressConfig, input: CalculationInput, detail: bool) -> Result<()> {
    let json = if detail {
        let report = physics_engine::compute_report(&input, &config.parameters)?;
        serde_json::to_string_pretty(&report)?
    } else {
        let output = physics_engine::compute(&input, &config.parameters)?;
        serde_json::to_string_pretty(&output)?
    };
    println!("{json}");
    Ok(())
}

fn run_check_config(config: &PressConfig) -> Result<()> {
    config.validate().context("Press config is invalid")?;
    print!("{}", config.to_toml()?);
    info!("✓ Press config is valid");
    Ok(())
}

async fn run_server(config: PressConfig, addr_override: Option<String>) -> Result<()> {
    let server_addr = addr_override.unwrap_or_else(|| config.server_addr());

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  puller-calc - Extrusion Press Puller Calculator");
    info!(
        "  Press: {} | Max force: {:.0} kgf | Max speed: {:.1} m/min",
        config.press.name, config.parameters.max_force_kgf, config.parameters.max_speed_m_min
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let app = create_app(ApiState::new(config));

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;
    info!("✓ HTTP server listening on {}", server_addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await;

    match result {
        Ok(()) => {
            info!("✓ puller-calc shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Server error: {}", e);
            Err(anyhow::anyhow!("HTTP server error: {e}"))
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_ref())?;

    match args.command.unwrap_or(SubCommand::Serve) {
        SubCommand::Serve => run_server(config, args.addr).await,
        SubCommand::Calc {
            ratio,
            run_out,
            setpoint,
            cavities,
            detail,
        } => {
            let input = CalculationInput::new(ratio)
                .with_run_out(run_out)
                .with_set_speed(setpoint)
                .with_cavities(cavities);
            run_calc(&config, input, detail)
        }
        SubCommand::CheckConfig => run_check_config(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_serve() {
        let args = CliArgs::try_parse_from(["puller-calc"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.addr.is_none());
    }

    #[test]
    fn test_cli_calc_arguments() {
        let args = CliArgs::try_parse_from([
            "puller-calc", "calc", "--ratio", "10", "--setpoint", "5", "--cavities", "-2",
        ])
        .unwrap();
        match args.command {
            Some(SubCommand::Calc { ratio, setpoint, cavities, run_out, detail }) => {
                assert_eq!(ratio, 10.0);
                assert_eq!(setpoint, 5.0);
                assert_eq!(cavities, -2);
                assert_eq!(run_out, 0.0);
                assert!(!detail);
            }
            other => panic!("expected calc, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_requires_ratio() {
        assert!(CliArgs::try_parse_from(["puller-calc", "calc"]).is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_fatal() {
        let path = PathBuf::from("/nonexistent/press_config.toml");
        assert!(load_config(Some(&path)).is_err());
    }
}
