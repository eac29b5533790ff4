use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a buoy export into a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("no data found after header detection")]
    Empty,

    #[error("column not found: {0}")]
    MissingColumn(String),
}

/// Errors raised while loading or validating engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
