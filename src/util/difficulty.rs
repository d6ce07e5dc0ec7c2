// `f64::exp` is not const
pub fn logistic(x: f64, midpoint_offset: f64, multiplier: f64, max_value: Option<f64>) -> f64 {
    max_value.unwrap_or(1.0) / (1.0 + f64::exp(multiplier * (midpoint_offset - x)))
}

// `f64::mul_add` is not const
pub const fn lerp(start: f64, end: f64, amount: f64) -> f64 {
    start + (end - start) * amount
}
