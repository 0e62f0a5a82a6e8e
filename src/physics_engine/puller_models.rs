//! Puller force, ramp and torque models
//!
//! Each function is one step of the press model. Operation order inside
//! every expression is fixed: the outputs are rounded to integers and
//! labels, so reassociating a product can flip a reported value.

use crate::config::defaults::{BILLET_AREA_IN2, GRAVITY, PSI_TO_PA};
use crate::config::PressParameters;

/// Burp pressure growth per unit of ln(ratio) (psi).
const BURP_LN_COEFFICIENT_PSI: f64 = 100.0;

/// Burp pressure floor from the billet face (psi), 10 psi per in².
const BURP_OFFSET_PSI: f64 = 10.0 * BILLET_AREA_IN2;

/// Burp pressure (psi) for a draw ratio given as its natural log.
///
/// `burp = 100 * ln(ratio) + 785.4`
pub fn burp_pressure_psi(ln_ratio: f64) -> f64 {
    BURP_LN_COEFFICIENT_PSI * ln_ratio + BURP_OFFSET_PSI
}

pub fn psi_to_pa(psi: f64) -> f64 {
    psi * PSI_TO_PA
}

/// Extruded profile area (m²) from the billet area and draw ratio.
pub fn extruded_area_m2(params: &PressParameters, ratio: f64) -> f64 {
    params.billet_area_m2 / ratio
}

/// Profile speed as percent of press maximum. Zero when the puller is stopped.
pub fn profile_speed_percent(params: &PressParameters, set_speed: f64) -> f64 {
    if set_speed > 0.0 {
        (set_speed / params.profile_speed_divisor)
            .min(params.max_speed_m_min / params.profile_speed_divisor)
    } else {
        0.0
    }
}

/// Position of the ratio between the configured ratio bounds on a log scale.
///
/// 0 at `ratio_min`, 1 at `ratio_max`; not clamped, so ratios outside the
/// bounds extrapolate.
pub fn ratio_interpolation(params: &PressParameters, ln_ratio: f64) -> f64 {
    let ln_min = params.ratio_min.ln();
    let ln_max = params.ratio_max.ln();
    (ln_ratio - ln_min) / (ln_max - ln_min)
}

/// Ramp input (1-100 scale) for a puller force and set speed.
///
/// Heavier pulls and slower set speeds lengthen the ramp. A stopped puller
/// (set speed not above zero, NaN included) gets the shortest ramp.
///
/// Bounds are applied with `min`/`max` rather than `clamp` so a NaN raw value
/// settles on `ramp_max` instead of propagating.
pub fn ramp_input(params: &PressParameters, interpolation: f64, puller_force: f64, set_speed: f64) -> f64 {
    if set_speed > 0.0 {
        let raw = params.ramp_min
            + (params.ramp_max - params.ramp_min)
                * interpolation
                * (puller_force / params.max_force_kgf)
                * (params.max_speed_m_min / set_speed);
        params.ramp_min.max(params.ramp_max.min(raw))
    } else {
        params.ramp_min
    }
}

/// Ramp time in seconds (input 1-100 maps to 0.1-10 s).
pub fn ramp_seconds(ramp_input: f64) -> f64 {
    ramp_input / 10.0
}

/// Drive torque including the acceleration term.
pub fn drive_torque(params: &PressParameters, puller_force: f64, set_speed: f64, ramp_seconds: f64) -> f64 {
    if set_speed > 0.0 {
        params.base_torque_factor
            + params.accel_torque_factor * puller_force * set_speed * (10.0 / ramp_seconds)
    } else {
        params.base_torque_factor
    }
}

/// Base pulling force (N) from burp pressure over the extruded area.
pub fn base_force_n(params: &PressParameters, burp_pa: f64, extruded_area_m2: f64, cavities: u8) -> f64 {
    burp_pa * extruded_area_m2 * f64::from(cavities) * params.speed_factor
}

pub fn newtons_to_kgf(newtons: f64) -> f64 {
    newtons / GRAVITY
}

/// Scale factor taking the base force to the interpolated puller force.
///
/// `None` when the base force is zero, since k is a ratio over it.
pub fn k_factor(params: &PressParameters, base_force_kgf: f64, interpolation: f64) -> Option<f64> {
    if base_force_kgf == 0.0 {
        return None;
    }
    let k_min = params.k_force_low_kgf / base_force_kgf;
    let k_max = params.k_force_high_kgf / base_force_kgf;
    Some(k_min + (k_max - k_min) * interpolation)
}

/// Puller force (kgf) before run-out scaling.
pub fn puller_force_base(k: f64, base_force_n: f64) -> f64 {
    k * base_force_n / GRAVITY
}

/// Apply run-out scaling: each unit of run-out per cavity adds a fixed fraction.
pub fn apply_run_out(params: &PressParameters, force: f64, run_out: f64, cavities: u8) -> f64 {
    force * (1.0 + params.run_out_factor * run_out * f64::from(cavities))
}

/// Clamp to the machine force limit. Only the upper bound is enforced; a NaN
/// force comes back as the limit.
pub fn cap_force(params: &PressParameters, force: f64) -> f64 {
    params.max_force_kgf.min(force)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PressParameters {
        PressParameters::default()
    }

    #[test]
    fn test_burp_pressure_at_ratio_10() {
        let burp = burp_pressure_psi(10f64.ln());
        assert!((burp - 1015.6585).abs() < 1e-3);
    }

    #[test]
    fn test_burp_offset_is_product_of_billet_area() {
        // 10 * 78.54 is not the same double as the literal 785.4.
        assert_eq!(BURP_OFFSET_PSI, 10.0 * 78.54);
        assert_eq!(burp_pressure_psi(0.0), BURP_OFFSET_PSI);
    }

    #[test]
    fn test_profile_speed_capped_at_max() {
        let p = params();
        assert_eq!(profile_speed_percent(&p, 0.0), 0.0);
        assert_eq!(profile_speed_percent(&p, -4.0), 0.0);
        assert!((profile_speed_percent(&p, 5.0) - 38.4615).abs() < 1e-3);
        assert_eq!(profile_speed_percent(&p, 20.0), 13.0 / 0.13);
    }

    #[test]
    fn test_interpolation_endpoints() {
        let p = params();
        assert_eq!(ratio_interpolation(&p, 5f64.ln()), 0.0);
        assert!((ratio_interpolation(&p, 100f64.ln()) - 1.0).abs() < 1e-12);
        assert!(ratio_interpolation(&p, 1f64.ln()) < 0.0);
    }

    #[test]
    fn test_ramp_input_stopped_puller_is_minimum() {
        let p = params();
        assert_eq!(ramp_input(&p, 0.5, 164.0, 0.0), 1.0);
        assert_eq!(ramp_input(&p, 0.5, 164.0, -1.0), 1.0);
        assert_eq!(ramp_input(&p, 0.5, 164.0, f64::NAN), 1.0);
    }

    #[test]
    fn test_ramp_input_clamped() {
        let p = params();
        // Slow speed, full ratio: raw value far above 100.
        assert_eq!(ramp_input(&p, 1.0, 190.0, 0.5), 100.0);
        // Negative interpolation pulls the raw value under 1.
        assert_eq!(ramp_input(&p, -0.5, 190.0, 5.0), 1.0);
        // NaN raw value settles on the upper bound.
        assert_eq!(ramp_input(&p, f64::NAN, 190.0, 5.0), 100.0);
    }

    #[test]
    fn test_torque_stopped_is_base() {
        let p = params();
        assert_eq!(drive_torque(&p, 190.0, 0.0, 0.1), 0.1);
    }

    #[test]
    fn test_torque_scales_with_acceleration() {
        let p = params();
        let slow = drive_torque(&p, 100.0, 5.0, 10.0);
        let fast = drive_torque(&p, 100.0, 5.0, 1.0);
        assert!((slow - 50.1).abs() < 1e-9);
        assert!((fast - 500.1).abs() < 1e-9);
    }

    #[test]
    fn test_k_factor_zero_base_force() {
        assert_eq!(k_factor(&params(), 0.0, 0.5), None);
    }

    #[test]
    fn test_puller_force_base_independent_of_area() {
        // k * base / g collapses to 50 + 140 * interpolation.
        let p = params();
        for base_kgf in [300.0, 1225.0, 4994.0] {
            let base_n = base_kgf * GRAVITY;
            let k = k_factor(&p, newtons_to_kgf(base_n), 0.5).unwrap();
            assert!((puller_force_base(k, base_n) - 120.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_run_out_and_cap() {
        let p = params();
        let scaled = apply_run_out(&p, 100.0, 100.0, 2);
        assert!((scaled - 130.0).abs() < 1e-9);
        assert_eq!(cap_force(&p, 250.0), 190.0);
        assert_eq!(cap_force(&p, 120.0), 120.0);
        assert_eq!(cap_force(&p, -20.0), -20.0);
        assert_eq!(cap_force(&p, f64::INFINITY), 190.0);
        assert_eq!(cap_force(&p, f64::NAN), 190.0);
    }
}
