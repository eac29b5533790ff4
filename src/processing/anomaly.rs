use serde::{Deserialize, Serialize};

use crate::processing::statistics::z_score;
use crate::processing::summary::StatsSummary;
use crate::state::observation::Record;

/// Deviation severity of a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Moderate,
    Extreme,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Moderate => "moderate",
            Severity::Extreme => "extreme",
        }
    }

    pub fn is_anomaly(&self) -> bool {
        !matches!(self, Severity::Normal)
    }
}

/// Z-score bands separating normal, moderate and extreme observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyBands {
    /// `|z|` at or above this is at least moderate. Also the sigma multiple
    /// of the one-sided anomaly threshold.
    pub moderate_sigma: f64,
    /// `|z|` at or above this is extreme.
    pub extreme_sigma: f64,
}

impl Default for AnomalyBands {
    fn default() -> Self {
        Self {
            moderate_sigma: 2.0,
            extreme_sigma: 3.0,
        }
    }
}

impl AnomalyBands {
    /// Two-sided classification by `|z|`. Missing (or NaN) z is normal.
    pub fn classify(&self, z: Option<f64>) -> Severity {
        let abs_z = match z {
            Some(z) if !z.is_nan() => z.abs(),
            _ => return Severity::Normal,
        };
        if abs_z >= self.extreme_sigma {
            Severity::Extreme
        } else if abs_z >= self.moderate_sigma {
            Severity::Moderate
        } else {
            Severity::Normal
        }
    }

    /// Upper cutoff `mean + moderate_sigma * std`.
    pub fn threshold(&self, field_mean: f64, field_std: f64) -> f64 {
        field_mean + self.moderate_sigma * field_std
    }

    /// One-sided test: only values strictly above the threshold are flagged.
    pub fn is_above_threshold(&self, value: Option<f64>, field_mean: f64, field_std: f64) -> bool {
        match value {
            Some(v) if !v.is_nan() => v > self.threshold(field_mean, field_std),
            _ => false,
        }
    }
}

/// Classify a Z-score with the default 2σ / 3σ bands.
pub fn classify(z: Option<f64>) -> Severity {
    AnomalyBands::default().classify(z)
}

/// True iff `value` is present and above `mean + 2 * std`.
///
/// Upper tail only; values far below the mean are never flagged here even
/// though [`classify`] reports them.
pub fn is_above_threshold(value: Option<f64>, field_mean: f64, field_std: f64) -> bool {
    AnomalyBands::default().is_above_threshold(value, field_mean, field_std)
}

/// Per-row anomaly overlay for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointAnnotation {
    pub index: usize,
    pub value: Option<f64>,
    pub z: Option<f64>,
    pub severity: Severity,
    pub above_threshold: bool,
}

/// Annotate every row of `field` against a summary computed for it.
///
/// Output is aligned one-to-one with `rows`. A summary without a mean
/// (no valid data) annotates every row as normal.
pub fn annotate<R: Record>(
    rows: &[R],
    field: &str,
    summary: &StatsSummary,
    bands: &AnomalyBands,
) -> Vec<PointAnnotation> {
    let stats = summary.mean.map(|m| (m, summary.std.unwrap_or(0.0)));

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let value = row.field(field);
            let (z, above_threshold) = match stats {
                Some((m, s)) => (z_score(value, m, s), bands.is_above_threshold(value, m, s)),
                None => (None, false),
            };
            PointAnnotation {
                index,
                value,
                z,
                severity: bands.classify(z),
                above_threshold,
            }
        })
        .collect()
}
