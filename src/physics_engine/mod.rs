//! Physics Engine Module
//!
//! Deterministic puller calculations for the extrusion press.
//! All math here is closed-form: no state, no I/O, no iteration.
//!
//! ## Two-pass force/ramp resolution
//!
//! Ramp time depends on puller force and the reported force depends on the
//! same inputs, so the first ramp/torque pass runs on a seeded force
//! estimate (`initial_puller_force_kgf`, 164 kgf by default). The real force
//! is then computed and ramp/torque are recomputed once with it. The seeded
//! pass is kept in `PullerReport` but never reported.
//!
//! ## Functions
//! - `compute()` - input to the four operator values
//! - `compute_report()` - input to every intermediate value
//! - `validate_input()` - domain checks shared by HTTP and CLI

pub mod labels;
pub mod puller_models;

pub use labels::{format_decimal, profile_speed_label, torque_ramp_label};
pub use puller_models::{
    apply_run_out, base_force_n, burp_pressure_psi, cap_force, drive_torque, extruded_area_m2,
    k_factor, newtons_to_kgf, profile_speed_percent, psi_to_pa, puller_force_base, ramp_input,
    ramp_seconds, ratio_interpolation,
};

use tracing::debug;

use crate::config::PressParameters;
use crate::types::{CalculationError, CalculationInput, CalculationOutput, PullerReport};

/// Compute the operator values for one input.
pub fn compute(
    input: &CalculationInput,
    params: &PressParameters,
) -> Result<CalculationOutput, CalculationError> {
    compute_report(input, params).map(|report| output_from_report(&report))
}

/// Reject inputs the model has no meaning for.
///
/// The ratio must be finite and positive (its log is taken). Run-out and set
/// speed accept any value: a non-positive or NaN set speed means a stopped
/// puller, and an infinite run-out is absorbed by the force cap.
pub fn validate_input(input: &CalculationInput) -> Result<(), CalculationError> {
    if !input.ratio.is_finite() || input.ratio <= 0.0 {
        return Err(CalculationError::invalid("ratio", input.ratio.to_string()));
    }
    Ok(())
}

/// Run the full model and keep every intermediate.
pub fn compute_report(
    input: &CalculationInput,
    params: &PressParameters,
) -> Result<PullerReport, CalculationError> {
    validate_input(input)?;

    let ratio = input.ratio;
    let set_speed = input.set_speed;
    let cavities = input.cavities;

    let ln_ratio = ratio.ln();
    let interpolation = ratio_interpolation(params, ln_ratio);
    let burp_psi = burp_pressure_psi(ln_ratio);
    let burp_pa = psi_to_pa(burp_psi);
    let extruded_area = extruded_area_m2(params, ratio);
    let speed_percent = profile_speed_percent(params, set_speed);

    // Pass 1: seeded force estimate
    let seed_force = params.initial_puller_force_kgf;
    let provisional_ramp_input = ramp_input(params, interpolation, seed_force, set_speed);
    let provisional_ramp_seconds = ramp_seconds(provisional_ramp_input);
    let provisional_torque = drive_torque(params, seed_force, set_speed, provisional_ramp_seconds);

    // Actual force
    let base_n = base_force_n(params, burp_pa, extruded_area, cavities);
    let base_kgf = newtons_to_kgf(base_n);
    let k = k_factor(params, base_kgf, interpolation)
        .ok_or_else(|| CalculationError::Calculation("float division by zero".to_string()))?;
    let force_base = puller_force_base(k, base_n);
    let force_total = apply_run_out(params, force_base, input.run_out, cavities);
    // NaN and +inf both land on the cap.
    let force_final = cap_force(params, force_total);
    if force_final == f64::NEG_INFINITY {
        return Err(CalculationError::Calculation(
            "cannot convert float infinity to integer".to_string(),
        ));
    }

    // Pass 2: corrected with the actual force
    let final_ramp_input = ramp_input(params, interpolation, force_final, set_speed);
    let final_ramp_seconds = ramp_seconds(final_ramp_input);
    let torque = drive_torque(params, force_final, set_speed, final_ramp_seconds);

    debug!(
        ratio,
        set_speed,
        cavities,
        burp_psi,
        base_force_kgf = base_kgf,
        puller_force = force_final,
        ramp_seconds = final_ramp_seconds,
        torque,
        "Puller calculation complete"
    );

    Ok(PullerReport {
        input: *input,
        ln_ratio,
        ratio_interpolation: interpolation,
        burp_psi,
        burp_pa,
        extruded_area_m2: extruded_area,
        profile_speed_percent: speed_percent,
        provisional_ramp_input,
        provisional_ramp_seconds,
        provisional_torque,
        base_force_n: base_n,
        base_force_kgf: base_kgf,
        k_factor: k,
        puller_force_base: force_base,
        puller_force_total: force_total,
        puller_force_final: force_final,
        ramp_input: final_ramp_input,
        ramp_seconds: final_ramp_seconds,
        torque,
    })
}

/// Reduce a report to the values the operator sees.
///
/// Force rounds half to even; burp pressure truncates toward zero.
pub fn output_from_report(report: &PullerReport) -> CalculationOutput {
    CalculationOutput {
        profile_speed: profile_speed_label(report.profile_speed_percent, report.input.set_speed),
        torque_ramp: torque_ramp_label(report.ramp_seconds),
        puller_force: report.puller_force_final.round_ties_even() as i64,
        burp_psi: report.burp_psi.trunc() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(ratio: f64, run_out: f64, set_speed: f64, cavities: i64) -> CalculationOutput {
        let input = CalculationInput::new(ratio)
            .with_run_out(run_out)
            .with_set_speed(set_speed)
            .with_cavities(cavities);
        compute(&input, &PressParameters::default()).unwrap()
    }

    #[test]
    fn test_reference_case() {
        let out = run(10.0, 0.0, 5.0, 2);
        assert_eq!(out.profile_speed, "38% (5.0)");
        assert_eq!(out.torque_ramp, "27 (2.7s)");
        assert_eq!(out.puller_force, 82);
        assert_eq!(out.burp_psi, 1015);
    }

    #[test]
    fn test_stopped_puller() {
        let out = run(10.0, 0.0, 0.0, 1);
        assert_eq!(out.profile_speed, "0% (0.0)");
        assert_eq!(out.torque_ramp, "1 (0.1s)");
        assert_eq!(out.puller_force, 82);
    }

    #[test]
    fn test_negative_set_speed_treated_as_stopped() {
        let out = run(10.0, 0.0, -3.0, 1);
        assert_eq!(out.profile_speed, "0% (0.0)");
        assert_eq!(out.torque_ramp, "1 (0.1s)");
    }

    #[test]
    fn test_high_ratio_hits_force_cap() {
        let out = run(100.0, 500.0, 13.0, 4);
        assert_eq!(out.profile_speed, "100% (13.0)");
        assert_eq!(out.torque_ramp, "100 (10.0s)");
        assert_eq!(out.puller_force, 190);
        assert_eq!(out.burp_psi, 1245);
    }

    #[test]
    fn test_run_out_scales_force() {
        let out = run(50.0, 20.0, 8.5, 3);
        assert_eq!(out.profile_speed, "65% (8.5)");
        assert_eq!(out.torque_ramp, "100 (10.0s)");
        assert_eq!(out.puller_force, 172);
        assert_eq!(out.burp_psi, 1176);
    }

    #[test]
    fn test_fast_set_speed_short_ramp() {
        let out = run(10.0, 0.0, 20.0, 1);
        assert_eq!(out.profile_speed, "100% (20.0)");
        assert_eq!(out.torque_ramp, "7 (0.7s)");
    }

    #[test]
    fn test_min_ratio_floor_force() {
        let out = run(5.0, 0.0, 5.0, 1);
        assert_eq!(out.puller_force, 50);
        assert_eq!(out.burp_psi, 946);
        assert_eq!(out.torque_ramp, "1 (0.1s)");
    }

    #[test]
    fn test_ratio_below_range_extrapolates() {
        // Below ratio_min the interpolation goes negative and so does the force.
        let out = run(1.0, 0.0, 5.0, 1);
        assert_eq!(out.puller_force, -25);
        assert_eq!(out.burp_psi, 785);
        assert_eq!(out.torque_ramp, "19 (1.9s)");
    }

    #[test]
    fn test_two_pass_report() {
        let input = CalculationInput::new(10.0).with_set_speed(5.0).with_cavities(2);
        let report = compute_report(&input, &PressParameters::default()).unwrap();

        assert!((report.provisional_ramp_input - 52.407).abs() < 1e-2);
        assert!((report.provisional_torque - 156.568).abs() < 1e-3);
        assert!((report.ramp_input - 26.8266).abs() < 1e-3);
        assert!((report.torque - 153.6657).abs() < 1e-3);
        assert!((report.base_force_kgf - 4994.418).abs() < 1e-2);
        assert_eq!(report.puller_force_total, report.puller_force_final);
    }

    #[test]
    fn test_cap_recorded_in_report() {
        let input = CalculationInput::new(100.0)
            .with_run_out(500.0)
            .with_set_speed(13.0)
            .with_cavities(4);
        let report = compute_report(&input, &PressParameters::default()).unwrap();
        assert!((report.puller_force_total - 760.0).abs() < 1e-6);
        assert_eq!(report.puller_force_final, 190.0);
    }

    #[test]
    fn test_invalid_ratio() {
        let params = PressParameters::default();
        for ratio in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = compute(&CalculationInput::new(ratio), &params).unwrap_err();
            assert!(
                matches!(err, CalculationError::InvalidInput { ref field, .. } if field == "ratio"),
                "ratio {ratio} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_overflowing_run_out_hits_cap() {
        let out = run(100.0, 1.7e308, 13.0, 4);
        assert_eq!(out.profile_speed, "100% (13.0)");
        assert_eq!(out.torque_ramp, "100 (10.0s)");
        assert_eq!(out.puller_force, 190);
        assert_eq!(out.burp_psi, 1245);
    }

    #[test]
    fn test_subnormal_ratio_nan_force_hits_cap() {
        // Extruded area overflows, base force goes to -inf and k * base to NaN.
        let input = CalculationInput::new(1e-320).with_set_speed(5.0);
        let report = compute_report(&input, &PressParameters::default()).unwrap();
        assert!(report.puller_force_total.is_nan());
        assert_eq!(report.puller_force_final, 190.0);

        let out = output_from_report(&report);
        assert_eq!(out.profile_speed, "38% (5.0)");
        assert_eq!(out.torque_ramp, "1 (0.1s)");
        assert_eq!(out.puller_force, 190);
        assert_eq!(out.burp_psi, -72897);
    }

    #[test]
    fn test_nan_run_out_hits_cap() {
        assert_eq!(run(10.0, f64::NAN, 5.0, 2).puller_force, 190);
    }

    #[test]
    fn test_negative_infinite_run_out_is_calculation_error() {
        let input = CalculationInput::new(10.0).with_run_out(f64::NEG_INFINITY);
        let err = compute(&input, &PressParameters::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Calculation error: cannot convert float infinity to integer"
        );
    }

    #[test]
    fn test_infinite_set_speed() {
        let out = run(10.0, 0.0, f64::INFINITY, 2);
        assert_eq!(out.profile_speed, "100% (inf)");
        assert_eq!(out.torque_ramp, "1 (0.1s)");
        assert_eq!(out.puller_force, 82);
    }

    #[test]
    fn test_nan_set_speed_treated_as_stopped() {
        let out = run(10.0, 0.0, f64::NAN, 2);
        assert_eq!(out.profile_speed, "0% (0.0)");
        assert_eq!(out.torque_ramp, "1 (0.1s)");
        assert_eq!(out.puller_force, 82);
    }

    #[test]
    fn test_zero_base_force_is_calculation_error() {
        let mut params = PressParameters::default();
        params.speed_factor = 0.0;
        let err = compute(&CalculationInput::new(10.0), &params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Calculation error: float division by zero"
        );
    }

    #[test]
    fn test_force_never_exceeds_cap() {
        for ratio in [1.5, 5.0, 12.0, 40.0, 100.0, 400.0] {
            for run_out in [0.0, 10.0, 250.0, 5000.0] {
                for set_speed in [0.0, 0.5, 6.0, 13.0, 30.0] {
                    for cavities in 1..=4 {
                        let out = run(ratio, run_out, set_speed, cavities);
                        assert!(out.puller_force <= 190, "force {} for ratio {ratio}", out.puller_force);
                    }
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(run(37.5, 12.0, 7.25, 3), run(37.5, 12.0, 7.25, 3));
    }
}
