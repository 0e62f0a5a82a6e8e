//! Operator-facing label formatting.
//!
//! The press HMI reads these strings as-is, so the text must stay stable:
//! set speed is printed in shortest round-trip form with a decimal point,
//! ramp codes round half to even.

/// Shortest round-trip rendering of a float that always reads as a float.
///
/// `5.0` prints as `5.0` (not `5`), `0.25` as `0.25`. Magnitudes below 1e-4
/// or at/above 1e16 switch to exponent form with a signed two-digit
/// exponent, `1e-05` / `1.5e+16`.
pub fn format_decimal(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{value:e}");
        return match sci.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => sci,
        };
    }

    let plain = value.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{plain}.0")
    }
}

/// `"{trunc(percent)}% ({set_speed})"`, or `"0% (0.0)"` for a stopped puller.
pub fn profile_speed_label(percent: f64, set_speed: f64) -> String {
    if set_speed > 0.0 {
        format!("{}% ({})", percent.trunc() as i64, format_decimal(set_speed))
    } else {
        "0% (0.0)".to_string()
    }
}

/// `"{ramp code} ({seconds:.1}s)"` where the code is seconds x 10, rounded
/// half to even.
pub fn torque_ramp_label(ramp_seconds: f64) -> String {
    format!("{} ({ramp_seconds:.1}s)", (ramp_seconds * 10.0).round_ties_even() as i64)
}
