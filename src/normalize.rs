use crate::data::Column;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    /// Zero or undefined standard deviation.
    #[error("size column has zero or undefined variance ({valid} finite values)")]
    Degenerate { valid: usize },
    #[error("size column '{0}' is not numeric")]
    NonNumeric(String),
}

/// Mean and sample standard deviation over the finite values of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl ColumnStats {
    /// Missing (NaN) and infinite values are ignored.
    pub fn compute(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let count = finite.len();
        if count == 0 {
            return Self { count, mean: f64::NAN, std_dev: f64::NAN };
        }

        let mean = finite.iter().sum::<f64>() / count as f64;
        let std_dev = if count < 2 {
            f64::NAN
        } else {
            let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        };

        Self { count, mean, std_dev }
    }
}

/// Rescale a column into non-negative marker sizes.
///
/// Values are z-scored, then shifted up by the magnitude of the floored
/// minimum z-score. Missing entries stay NaN.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>, NormalizeError> {
    let stats = ColumnStats::compute(values);
    if !stats.std_dev.is_finite() || stats.std_dev == 0.0 {
        return Err(NormalizeError::Degenerate { valid: stats.count });
    }

    let z: Vec<f64> = values.iter().map(|v| (v - stats.mean) / stats.std_dev).collect();
    let floor_min = z
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::INFINITY, f64::min)
        .floor();
    let shift = floor_min.abs();

    Ok(z.into_iter().map(|v| v + shift).collect())
}

/// Normalize a dataset column, rejecting categorical columns.
pub fn normalize_column(column: &Column) -> Result<Vec<f64>, NormalizeError> {
    let values = column
        .numeric_values()
        .ok_or_else(|| NormalizeError::NonNumeric(column.name.clone()))?;
    normalize(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min(values: &[f64]) -> f64 {
        values.iter().copied().filter(|v| v.is_finite()).fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_normalize_symmetric_column() {
        // mean 2, sample std 1 -> z = [-1, 0, 1], floor(-1) = -1
        let out = normalize(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(out, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_normalize_is_non_negative() {
        let out = normalize(&[10.0, -4.0, 3.5, 7.25, 0.0, 1e3]).unwrap();
        assert!(out.iter().all(|&v| v >= 0.0));
        assert!(min(&out) < 1.0);
    }

    #[test]
    fn test_normalize_preserves_order_and_spacing() {
        let out = normalize(&[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert!(out.windows(2).all(|w| w[0] < w[1]));
        let d1 = out[1] - out[0];
        let d2 = out[3] - out[2];
        assert!((d1 - d2).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_ignores_missing() {
        let out = normalize(&[1.0, f64::NAN, 2.0, 3.0]).unwrap();
        assert!(out[1].is_nan());
        assert_eq!(out[0], 0.0);
        assert_eq!(out[3], 2.0);
    }

    #[test]
    fn test_constant_column_is_degenerate() {
        let err = normalize(&[5.0, 5.0, 5.0, 5.0]).unwrap_err();
        assert_eq!(err, NormalizeError::Degenerate { valid: 4 });
    }

    #[test]
    fn test_short_columns_are_degenerate() {
        assert!(matches!(normalize(&[]), Err(NormalizeError::Degenerate { valid: 0 })));
        assert!(matches!(normalize(&[3.0]), Err(NormalizeError::Degenerate { valid: 1 })));
        assert!(matches!(
            normalize(&[f64::NAN, f64::NAN]),
            Err(NormalizeError::Degenerate { valid: 0 })
        ));
    }

    #[test]
    fn test_categorical_column_rejected() {
        let col = Column::text("species", &["a", "b"]);
        assert_eq!(normalize_column(&col), Err(NormalizeError::NonNumeric("species".into())));
    }

    #[test]
    fn test_column_stats() {
        let stats = ColumnStats::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        assert!((stats.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }
}
