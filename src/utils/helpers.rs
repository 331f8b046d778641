// src/utils/helpers.rs

use serde_json::Value;

/// Coerces a JSON value to a float, falling back to a default.
///
/// Accepts numbers and numeric strings; anything else (null, objects,
/// unparseable text, NaN) yields the default.
pub fn safe_parse_float(value: &Value, default_value: f64) -> f64 {
    parse_float_opt(value).unwrap_or(default_value)
}

/// Coerces a JSON value to a float, keeping "absent" distinct from zero.
pub fn parse_float_opt(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Returns the string content of a JSON value, treating `""` as absent.
pub fn non_empty_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
