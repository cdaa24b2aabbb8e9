// Arithmetic guards: zero denominators resolve to a caller-chosen default.

/// Divide `numerator` by `denominator`, returning `default` when the
/// denominator is zero or the result is not finite.
pub fn safe_div(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 {
        return default;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Arithmetic mean, or `default` for an empty slice.
pub fn mean_or(values: &[f64], default: f64) -> f64 {
    safe_div(values.iter().sum(), values.len() as f64, default)
}
