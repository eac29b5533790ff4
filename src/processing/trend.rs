use serde::{Deserialize, Serialize};

use crate::processing::statistics::{mean_of, valid_values};

/// Coarse long-run direction of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Increasing => "Increasing",
            Trend::Decreasing => "Decreasing",
            Trend::Stable => "Stable",
        }
    }
}

/// Early-vs-late comparison parameters.
///
/// The relative band is a fixed cutoff on the change between the two chunk
/// means. It is not scaled by the series' variance and makes no claim of
/// statistical significance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Share of the valid values averaged at each end (rounded up, at least 1).
    pub fraction: f64,
    /// Fewer valid values than this always yields `Stable`.
    pub min_points: usize,
    /// Relative change that must be exceeded to leave `Stable`.
    pub relative_band: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            fraction: 0.2,
            min_points: 5,
            relative_band: 0.01,
        }
    }
}

impl TrendConfig {
    /// Number of values in each end chunk for a series of `n` valid values.
    pub fn chunk_len(&self, n: usize) -> usize {
        // Round away float noise (e.g. 15 * 0.2) before taking the ceiling.
        let raw = (n as f64 * self.fraction * 1e9).round() / 1e9;
        (raw.ceil() as usize).clamp(1, n.max(1))
    }

    pub fn direction(&self, values: &[Option<f64>]) -> Trend {
        let valid = valid_values(values);
        if valid.len() < self.min_points.max(1) {
            return Trend::Stable;
        }

        let chunk = self.chunk_len(valid.len());
        let (first_avg, last_avg) = match (
            mean_of(&valid[..chunk]),
            mean_of(&valid[valid.len() - chunk..]),
        ) {
            (Some(f), Some(l)) => (f, l),
            _ => return Trend::Stable,
        };
        if first_avg == 0.0 {
            return Trend::Stable;
        }

        let rel_change = (last_avg - first_avg) / first_avg.abs();
        if rel_change > self.relative_band {
            Trend::Increasing
        } else if rel_change < -self.relative_band {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

/// Trend with the default 20% chunks, 5-point minimum and ±1% band.
pub fn trend_direction(values: &[Option<f64>]) -> Trend {
    TrendConfig::default().direction(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|&v| Some(v)).collect()
    }

    #[test]
    fn late_jump_is_increasing() {
        let values = col(&[10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 20.0]);
        assert_eq!(trend_direction(&values), Trend::Increasing);
    }

    #[test]
    fn falling_series_is_decreasing() {
        let values = col(&[20.0, 19.0, 18.0, 17.0, 16.0, 15.0]);
        assert_eq!(trend_direction(&values), Trend::Decreasing);
    }

    #[test]
    fn too_few_points_is_stable() {
        assert_eq!(trend_direction(&col(&[1.0, 100.0, 1000.0, 10000.0])), Trend::Stable);
        // Missing values do not count toward the minimum.
        let values = vec![Some(1.0), None, Some(2.0), Some(f64::NAN), Some(3.0), Some(4.0)];
        assert_eq!(trend_direction(&values), Trend::Stable);
    }

    #[test]
    fn small_change_stays_stable() {
        let values = col(&[100.0, 100.0, 100.0, 100.0, 100.5]);
        assert_eq!(trend_direction(&values), Trend::Stable);
    }

    #[test]
    fn zero_start_is_stable() {
        let values = col(&[0.0, 0.0, 5.0, 10.0, 50.0]);
        assert_eq!(trend_direction(&values), Trend::Stable);
    }

    #[test]
    fn negative_start_uses_magnitude() {
        // -10 -> -5 is a rise relative to |-10|.
        let values = col(&[-10.0, -9.0, -8.0, -7.0, -5.0]);
        assert_eq!(trend_direction(&values), Trend::Increasing);
    }

    #[test]
    fn chunk_rounds_up() {
        let cfg = TrendConfig::default();
        assert_eq!(cfg.chunk_len(5), 1);
        assert_eq!(cfg.chunk_len(7), 2);
        assert_eq!(cfg.chunk_len(10), 2);
        assert_eq!(cfg.chunk_len(15), 3);
        assert_eq!(cfg.chunk_len(0), 1);
    }

    #[test]
    fn configurable_band() {
        let cfg = TrendConfig {
            relative_band: 0.6,
            ..TrendConfig::default()
        };
        let values = col(&[10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 20.0]);
        assert_eq!(cfg.direction(&values), Trend::Stable);
    }

    #[test]
    fn labels() {
        assert_eq!(Trend::Decreasing.label(), "Decreasing");
        assert_eq!(serde_json::to_string(&Trend::Stable).unwrap(), "\"Stable\"");
    }
}
