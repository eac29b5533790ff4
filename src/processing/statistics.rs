//! Numeric primitives shared by the summary, trend and anomaly code.
//!
//! Every function takes a position-preserving column (`Option<f64>` per row)
//! and ignores missing entries. `Some(NaN)` counts as missing.

/// True for a value that participates in statistics.
pub fn is_valid(value: Option<f64>) -> bool {
    matches!(value, Some(v) if !v.is_nan())
}

/// Collect the valid values of a column, in order.
pub fn valid_values(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().copied().filter(|v| is_valid(*v)).flatten().collect()
}

/// Arithmetic mean over valid values, `None` when there are none.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    mean_of(&valid_values(values))
}

/// Population standard deviation over valid values.
///
/// Returns `0.0` with fewer than two valid values so Z-score math never
/// divides by a missing deviation.
pub fn population_std_dev(values: &[Option<f64>]) -> f64 {
    std_dev_of(&valid_values(values))
}

/// Distance of `value` from the mean in standard deviations.
///
/// `None` for a missing value; `0.0` when the deviation is zero.
pub fn z_score(value: Option<f64>, field_mean: f64, field_std: f64) -> Option<f64> {
    let v = value.filter(|v| !v.is_nan())?;
    if field_std == 0.0 {
        return Some(0.0);
    }
    Some((v - field_mean) / field_std)
}

/// `(min, max)` of already-filtered values.
pub fn min_max(valid: &[f64]) -> Option<(f64, f64)> {
    if valid.is_empty() {
        return None;
    }
    let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
    let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

pub(crate) fn mean_of(valid: &[f64]) -> Option<f64> {
    if valid.is_empty() {
        return None;
    }
    Some(valid.iter().sum::<f64>() / valid.len() as f64)
}

pub(crate) fn std_dev_of(valid: &[f64]) -> f64 {
    if valid.len() < 2 {
        return 0.0;
    }
    let count = valid.len() as f64;
    let avg = valid.iter().sum::<f64>() / count;
    let variance = valid.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / count;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_ignores_missing() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[None, None, Some(f64::NAN)]), None);
        assert_eq!(mean(&[Some(2.0), Some(4.0), Some(6.0)]), Some(4.0));
        assert_eq!(mean(&[Some(2.0), None, Some(6.0)]), Some(4.0));
    }

    #[test]
    fn std_dev_is_population() {
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[Some(42.0)]), 0.0);
        assert_eq!(population_std_dev(&[Some(42.0), None, Some(f64::NAN)]), 0.0);
        assert_eq!(population_std_dev(&[Some(2.0), Some(2.0), Some(2.0)]), 0.0);
        assert_eq!(population_std_dev(&[Some(0.0), Some(10.0)]), 5.0);
    }

    #[test]
    fn z_score_guards() {
        assert_eq!(z_score(Some(17.0), 3.0, 0.0), Some(0.0));
        assert_eq!(z_score(None, 3.0, 1.0), None);
        assert_eq!(z_score(Some(f64::NAN), 3.0, 1.0), None);
        assert_eq!(z_score(Some(7.0), 3.0, 2.0), Some(2.0));
        assert_eq!(z_score(Some(-1.0), 3.0, 2.0), Some(-2.0));
    }

    #[test]
    fn min_max_of_values() {
        assert_eq!(min_max(&[]), None);
        assert_eq!(min_max(&[3.0, -1.0, 8.5]), Some((-1.0, 8.5)));
    }

    #[test]
    fn valid_values_keep_order() {
        let col = [Some(3.0), None, Some(f64::NAN), Some(1.0)];
        assert_eq!(valid_values(&col), vec![3.0, 1.0]);
        assert!(is_valid(Some(0.0)));
        assert!(!is_valid(Some(f64::NAN)));
    }
}
