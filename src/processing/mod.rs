//! Statistics and anomaly engine.
//!
//! Everything here is a pure function of its inputs: no I/O, no logging,
//! no state kept between calls.

pub mod anomaly;
pub mod moving_average;
pub mod statistics;
pub mod summary;
pub mod trend;

pub use anomaly::{annotate, classify, is_above_threshold, AnomalyBands, PointAnnotation, Severity};
pub use moving_average::{moving_average, moving_average_values, DEFAULT_WINDOW};
pub use statistics::{mean, population_std_dev, z_score};
pub use summary::{
    compute_all_stats, compute_all_stats_with, compute_stats, compute_stats_with, AnalysisConfig,
    StatsSummary,
};
pub use trend::{trend_direction, Trend, TrendConfig};
