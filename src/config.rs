use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::sentinel::DEFAULT_SENTINELS;
use crate::error::ConfigError;
use crate::processing::anomaly::AnomalyBands;
use crate::processing::moving_average::DEFAULT_WINDOW;
use crate::processing::summary::AnalysisConfig;
use crate::processing::trend::TrendConfig;

/// Tunable thresholds for the engine and the loader.
///
/// Every member has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub bands: AnomalyBands,
    pub trend: TrendConfig,
    pub moving_average_window: usize,
    pub missing_sentinels: Vec<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bands: AnomalyBands::default(),
            trend: TrendConfig::default(),
            moving_average_window: DEFAULT_WINDOW,
            missing_sentinels: DEFAULT_SENTINELS.to_vec(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::info!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bands = &self.bands;
        if !(bands.moderate_sigma > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "bands.moderate_sigma must be positive, got {}",
                bands.moderate_sigma
            )));
        }
        if !(bands.extreme_sigma >= bands.moderate_sigma) {
            return Err(ConfigError::Invalid(format!(
                "bands.extreme_sigma ({}) must be at least bands.moderate_sigma ({})",
                bands.extreme_sigma, bands.moderate_sigma
            )));
        }

        let trend = &self.trend;
        if !(trend.fraction > 0.0 && trend.fraction <= 0.5) {
            return Err(ConfigError::Invalid(format!(
                "trend.fraction must be in (0, 0.5], got {}",
                trend.fraction
            )));
        }
        if trend.min_points == 0 {
            return Err(ConfigError::Invalid("trend.min_points must be at least 1".into()));
        }
        if !(trend.relative_band >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "trend.relative_band must be non-negative, got {}",
                trend.relative_band
            )));
        }

        if self.moving_average_window == 0 {
            return Err(ConfigError::Invalid("moving_average_window must be at least 1".into()));
        }
        Ok(())
    }

    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            bands: self.bands,
            trend: self.trend,
        }
    }
}
