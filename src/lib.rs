//! Statistics and anomaly detection for oceanographic buoy measurements.
//!
//! The [`processing`] engine summarizes a field (mean, min, max, population
//! standard deviation, Z-score anomaly counts, trend) and builds trailing
//! moving averages. [`data`] reads CSV and Excel buoy exports into the
//! [`Dataset`] the engine consumes.

pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod state;

pub use config::EngineConfig;
pub use error::{ConfigError, LoadError};
pub use state::observation::{Dataset, Observation, Record};
