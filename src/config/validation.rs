//! Config validation: unknown-key detection with edit-distance suggestions
//! and physical range checks.
//!
//! The raw TOML is walked once as a `toml::Value` tree before serde sees it,
//! so a misspelled key (which serde would silently drop in favour of the
//! default) is reported. Unknown keys only ever produce warnings.

use std::collections::HashSet;
use std::fmt;

use super::PressConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        match &self.suggestion {
            Some(s) => write!(f, " (did you mean '{s}'?)"),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

const PARAMETER_KEYS: &[&str] = &[
    "billet_area_m2",
    "speed_factor",
    "ratio_min",
    "ratio_max",
    "ramp_min",
    "ramp_max",
    "max_speed_m_min",
    "max_force_kgf",
    "run_out_factor",
    "base_torque_factor",
    "accel_torque_factor",
    "initial_puller_force_kgf",
    "k_force_low_kgf",
    "k_force_high_kgf",
    "profile_speed_divisor",
];

/// Every valid dotted key path of `PressConfig`.
///
/// Any new field on `PressParameters` must be added to `PARAMETER_KEYS`.
pub fn known_config_keys() -> HashSet<String> {
    let sections = ["press", "press.name", "press.line", "parameters", "server", "server.addr"];
    let mut keys: HashSet<String> = sections
        .iter()
        .map(|k| (*k).to_string())
        .collect();
    keys.extend(PARAMETER_KEYS.iter().map(|k| format!("parameters.{k}")));
    keys
}

/// Collect every dotted key path in a TOML tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let Some(table) = value.as_table() else {
        return Vec::new();
    };

    let mut keys = Vec::new();
    for (k, v) in table {
        let path = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        if v.is_table() {
            let nested = walk_toml_keys(v, &path);
            keys.push(path);
            keys.extend(nested);
        } else {
            keys.push(path);
        }
    }
    keys
}

// ============================================================================
// Suggestions
// ============================================================================

/// Largest edit distance still offered as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Levenshtein distance over chars, single-row dynamic programming.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(ca != *cb);
            row[j + 1] = substitution.min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Closest known key within `MAX_SUGGESTION_DISTANCE` edits, ties broken
/// alphabetically so the suggestion is stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<String>) -> Option<String> {
    known
        .iter()
        .map(|k| (edit_distance(unknown, k), k))
        .filter(|(d, _)| *d <= MAX_SUGGESTION_DISTANCE)
        .min()
        .map(|(_, k)| k.clone())
}

/// Warn about every key in `raw_toml` the config does not know.
///
/// Malformed TOML yields no warnings; serde reports it during the real parse.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Check parameters against what a real press can do.
///
/// Returns (errors, warnings): errors are impossible values that must block
/// startup, warnings are unusual but allowed.
pub fn validate_physical_ranges(config: &PressConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let p = &config.parameters;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if p.speed_factor > 1.0 {
        errors.push(format!(
            "parameters.speed_factor = {:.2} is a fraction of puller speed and cannot exceed 1.0",
            p.speed_factor
        ));
    }

    if p.billet_area_m2 >= 1.0 {
        errors.push(format!(
            "parameters.billet_area_m2 = {:.4} is outside physical range (< 1 m²)",
            p.billet_area_m2
        ));
    }

    if p.run_out_factor < 0.0 {
        errors.push(format!(
            "parameters.run_out_factor = {} must not be negative",
            p.run_out_factor
        ));
    }

    if p.max_force_kgf > 1000.0 {
        warnings.push(ValidationWarning {
            field: "parameters.max_force_kgf".to_string(),
            message: format!(
                "parameters.max_force_kgf = {:.0} is far above typical puller ratings (190 kgf)",
                p.max_force_kgf
            ),
            suggestion: None,
        });
    }

    if p.max_speed_m_min > 100.0 {
        warnings.push(ValidationWarning {
            field: "parameters.max_speed_m_min".to_string(),
            message: format!(
                "parameters.max_speed_m_min = {:.1} m/min is unusually fast for an extrusion puller",
                p.max_speed_m_min
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}
