//! Error types for firewx operations.

use thiserror::Error;

/// Result type alias using FireWxError.
pub type FireWxResult<T> = Result<T, FireWxError>;

/// Primary error type shared by the firewx crates.
#[derive(Debug, Error)]
pub enum FireWxError {
    // === Lookup Errors ===
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Unknown reference system: {0}")]
    UnknownReferenceSystem(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    // === Data Errors ===
    #[error("Grid shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    #[error("Invalid GRIB2 data: {0}")]
    Grib2Error(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FireWxError {
    fn from(err: serde_json::Error) -> Self {
        FireWxError::ConfigError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for FireWxError {
    fn from(err: serde_yaml::Error) -> Self {
        FireWxError::ConfigError(format!("YAML error: {}", err))
    }
}
