/// Numeric codes NOAA/RAMA exports use in place of a missing measurement.
pub const DEFAULT_SENTINELS: [f64; 4] = [999.0, 9999.0, -999.0, -9999.0];

/// Parse one cell into a measurement.
///
/// Empty cells, unparseable text, non-finite numbers and sentinel codes all
/// become `None`.
pub fn parse_measurement(cell: &str, sentinels: &[f64]) -> Option<f64> {
    let v = cell.trim().parse::<f64>().ok()?;
    normalize(v, sentinels)
}

/// Map a parsed number to `None` if it is non-finite or a sentinel.
pub fn normalize(value: f64, sentinels: &[f64]) -> Option<f64> {
    if !value.is_finite() || sentinels.iter().any(|&s| s == value) {
        None
    } else {
        Some(value)
    }
}
