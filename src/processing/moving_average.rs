use crate::state::observation::{column_of, Record};

/// 24 samples: a one-day average for hourly buoy data.
pub const DEFAULT_WINDOW: usize = 24;

/// Trailing moving average of `field`, aligned one-to-one with `rows`.
///
/// Index `i` averages the valid values in `[i + 1 - window, i]`, clamped at
/// the start of the series. A window with no valid values yields `None`.
pub fn moving_average<R: Record>(rows: &[R], field: &str, window: usize) -> Vec<Option<f64>> {
    moving_average_values(&column_of(rows, field), window)
}

/// Same as [`moving_average`] over an already extracted column.
///
/// Each window is summed on its own, so a huge or infinite sample only
/// affects the windows that contain it.
pub fn moving_average_values(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let (sum, count) = values[start..=i]
                .iter()
                .filter_map(|v| v.filter(|v| !v.is_nan()))
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            (count > 0).then(|| sum / count as f64)
        })
        .collect()
}
