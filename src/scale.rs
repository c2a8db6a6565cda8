// Axis and colour ranges for figures

/// Minimum and maximum of the finite values, if any.
pub fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut finite = values.iter().copied().filter(|v| v.is_finite()).peekable();
    finite.peek()?;
    Some(finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Padded range for a continuous axis.
pub fn axis_range(values: &[f64]) -> (f64, f64) {
    match value_range(values) {
        Some((min, max)) => pad_range(min, max),
        None => (-1.0, 1.0),
    }
}

/// Range for a categorical axis with `n` categories at positions 0..n.
pub fn categorical_range(n: usize) -> (f64, f64) {
    (-0.5, n.max(1) as f64 - 0.5)
}

fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}
