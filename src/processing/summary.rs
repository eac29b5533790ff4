use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::processing::anomaly::{AnomalyBands, Severity};
use crate::processing::statistics::{mean_of, min_max, std_dev_of, z_score};
use crate::processing::trend::{Trend, TrendConfig};
use crate::state::observation::Record;

/// Thresholds used when summarizing a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub bands: AnomalyBands,
    pub trend: TrendConfig,
}

/// Statistics for one field of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std: Option<f64>,
    pub anomaly_threshold: Option<f64>,
    /// `moderate_count + extreme_count`.
    pub anomaly_count: usize,
    pub moderate_count: usize,
    pub extreme_count: usize,
    pub trend: Trend,
}

impl StatsSummary {
    /// Summary of a field with no valid values.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_data(&self) -> bool {
        self.mean.is_some()
    }

    /// Format as a multi-line report string.
    pub fn report(&self, label: &str, unit: &str) -> String {
        fn num(v: Option<f64>) -> String {
            v.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
        }

        format!(
            "{label} ({unit}):\n  Mean: {}\n  Min: {}\n  Max: {}\n  Std Dev: {}\n  Threshold: {}\n  Anomalies: {} ({} moderate, {} extreme)\n  Trend: {}\n",
            num(self.mean),
            num(self.min),
            num(self.max),
            num(self.std),
            num(self.anomaly_threshold),
            self.anomaly_count,
            self.moderate_count,
            self.extreme_count,
            self.trend.label()
        )
    }
}

/// Summarize `field` across `rows` with the default thresholds.
pub fn compute_stats<R: Record>(rows: &[R], field: &str) -> StatsSummary {
    compute_stats_with(rows, field, &AnalysisConfig::default())
}

/// Summarize `field` across `rows`.
///
/// Missing values are skipped for every statistic. Counts are taken over the
/// valid values with the two-sided Z-score bands.
pub fn compute_stats_with<R: Record>(rows: &[R], field: &str, config: &AnalysisConfig) -> StatsSummary {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.field(field)).collect();

    let Some(avg) = mean_of(&values) else {
        return StatsSummary::empty();
    };
    let sd = std_dev_of(&values);
    let (min, max) = min_max(&values).unwrap_or((avg, avg));

    let mut moderate_count = 0;
    let mut extreme_count = 0;
    for &v in &values {
        match config.bands.classify(z_score(Some(v), avg, sd)) {
            Severity::Extreme => extreme_count += 1,
            Severity::Moderate => moderate_count += 1,
            Severity::Normal => {}
        }
    }

    let column: Vec<Option<f64>> = values.iter().map(|&v| Some(v)).collect();

    StatsSummary {
        mean: Some(avg),
        min: Some(min),
        max: Some(max),
        std: Some(sd),
        anomaly_threshold: Some(config.bands.threshold(avg, sd)),
        anomaly_count: moderate_count + extreme_count,
        moderate_count,
        extreme_count,
        trend: config.trend.direction(&column),
    }
}

/// Summaries for every requested field; fields are computed independently.
pub fn compute_all_stats<R, S>(rows: &[R], fields: &[S]) -> BTreeMap<String, StatsSummary>
where
    R: Record,
    S: AsRef<str>,
{
    compute_all_stats_with(rows, fields, &AnalysisConfig::default())
}

pub fn compute_all_stats_with<R, S>(
    rows: &[R],
    fields: &[S],
    config: &AnalysisConfig,
) -> BTreeMap<String, StatsSummary>
where
    R: Record,
    S: AsRef<str>,
{
    fields
        .iter()
        .map(|f| {
            let key = f.as_ref();
            (key.to_string(), compute_stats_with(rows, key, config))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::observation::Observation;

    fn rows(values: &[Option<f64>]) -> Vec<Observation> {
        values
            .iter()
            .map(|v| Observation::new(None).with("t", *v))
            .collect()
    }

    #[test]
    fn no_valid_values_gives_empty_summary() {
        let summary = compute_stats(&rows(&[None, Some(f64::NAN)]), "t");
        assert_eq!(summary, StatsSummary::empty());
        assert!(!summary.has_data());
        assert_eq!(summary.trend, Trend::Stable);

        let none: Vec<Observation> = Vec::new();
        assert_eq!(compute_stats(&none, "t"), StatsSummary::empty());
    }

    #[test]
    fn three_point_series() {
        let summary = compute_stats(&rows(&[Some(0.0), None, Some(2.0), Some(100.0)]), "t");
        let sd = (6536.0f64 / 3.0).sqrt();

        assert_eq!(summary.mean, Some(34.0));
        assert_eq!(summary.min, Some(0.0));
        assert_eq!(summary.max, Some(100.0));
        assert!((summary.std.unwrap() - sd).abs() < 1e-9);
        assert!((summary.anomaly_threshold.unwrap() - (34.0 + 2.0 * sd)).abs() < 1e-9);
        // With three points |z| cannot exceed sqrt(2), so nothing is flagged.
        assert_eq!(summary.anomaly_count, 0);
        assert_eq!(summary.trend, Trend::Stable);
    }

    #[test]
    fn lone_outlier_is_the_only_anomaly() {
        let mut values = vec![Some(0.0), None, Some(2.0)];
        values.extend([1.0, 0.0, 2.0, 1.0, 1.0, 0.0, 2.0, 1.0].iter().map(|&v| Some(v)));
        values.push(Some(100.0));
        let summary = compute_stats(&rows(&values), "t");

        assert_eq!(summary.anomaly_count, 1);
        assert_eq!(summary.extreme_count, 1);
        assert_eq!(summary.moderate_count, 0);
        assert_eq!(summary.max, Some(100.0));
    }

    #[test]
    fn moderate_and_extreme_buckets() {
        // 20 zeros, then 3 and -3. Mean 0, std sqrt(18/22) ~ 0.905.
        // |z| of +-3 is ~3.32, extreme on both tails.
        let mut values = vec![Some(0.0); 20];
        values.push(Some(3.0));
        values.push(Some(-3.0));
        let summary = compute_stats(&rows(&values), "t");
        assert_eq!(summary.extreme_count, 2);
        assert_eq!(summary.moderate_count, 0);
        assert_eq!(summary.anomaly_count, 2);

        // Widen the bands so the same points count as moderate only.
        let config = AnalysisConfig {
            bands: AnomalyBands {
                moderate_sigma: 2.0,
                extreme_sigma: 4.0,
            },
            ..AnalysisConfig::default()
        };
        let summary = compute_stats_with(&rows(&values), "t", &config);
        assert_eq!(summary.extreme_count, 0);
        assert_eq!(summary.moderate_count, 2);
        assert_eq!(summary.anomaly_count, 2);
    }

    #[test]
    fn flat_series_has_no_anomalies() {
        let summary = compute_stats(&rows(&[Some(5.0); 8]), "t");
        assert_eq!(summary.std, Some(0.0));
        assert_eq!(summary.anomaly_threshold, Some(5.0));
        assert_eq!(summary.anomaly_count, 0);
    }

    #[test]
    fn compute_is_idempotent() {
        let data = rows(&[Some(3.0), Some(9.0), None, Some(4.0), Some(12.0), Some(1.0)]);
        assert_eq!(compute_stats(&data, "t"), compute_stats(&data, "t"));
    }

    #[test]
    fn all_stats_per_field() {
        let data = vec![
            Observation::new(None).with("a", Some(1.0)).with("b", None),
            Observation::new(None).with("a", Some(3.0)).with("b", Some(10.0)),
        ];
        let all = compute_all_stats(&data, &["a", "b", "c"]);
        assert_eq!(all.len(), 3);
        assert_eq!(all["a"].mean, Some(2.0));
        assert_eq!(all["b"].mean, Some(10.0));
        assert_eq!(all["b"].std, Some(0.0));
        assert_eq!(all["c"], StatsSummary::empty());

        let none: Vec<Observation> = Vec::new();
        let all = compute_all_stats(&none, &["a"]);
        assert_eq!(all["a"], StatsSummary::empty());

        let no_fields: [&str; 0] = [];
        assert!(compute_all_stats(&data, &no_fields).is_empty());
    }

    #[test]
    fn json_uses_camel_case() {
        let summary = compute_stats(&rows(&[Some(1.0), Some(3.0)]), "t");
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["anomalyThreshold"], serde_json::json!(4.0));
        assert_eq!(json["anomalyCount"], serde_json::json!(0));
        assert_eq!(json["trend"], serde_json::json!("Stable"));

        let empty = serde_json::to_value(StatsSummary::empty()).unwrap();
        assert!(empty["mean"].is_null());
    }

    #[test]
    fn report_marks_missing_numbers() {
        let text = StatsSummary::empty().report("Wave Height", "m");
        assert!(text.starts_with("Wave Height (m):"));
        assert!(text.contains("Mean: -"));
        assert!(text.contains("Trend: Stable"));
    }

    #[test]
    fn report_lists_every_statistic() {
        let summary = StatsSummary {
            mean: Some(1.25),
            min: Some(0.5),
            max: Some(6.5),
            std: Some(0.75),
            anomaly_threshold: Some(2.75),
            anomaly_count: 1,
            moderate_count: 0,
            extreme_count: 1,
            trend: Trend::Increasing,
        };
        let text = summary.report("Wave Height", "m");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[1], "  Mean: 1.250");
        assert_eq!(lines[5], "  Threshold: 2.750");
        assert_eq!(lines[6], "  Anomalies: 1 (0 moderate, 1 extreme)");
        assert!(text.ends_with("  Trend: Increasing\n"));
    }
}
