//! Error types for NDFD parsing.

use thiserror::Error;

pub type NdfdResult<T> = Result<T, NdfdError>;

#[derive(Debug, Error)]
pub enum NdfdError {
    #[error("Invalid GRIB2 format: {0}")]
    InvalidFormat(String),

    #[error("Invalid section {section}: {reason}")]
    InvalidSection { section: u8, reason: String },

    #[error("Unsupported template {section}.{template}")]
    UnsupportedTemplate { section: u8, template: u16 },

    #[error("Unpacking failed: {0}")]
    UnpackingError(String),

    #[error("grib decoder: {0}")]
    Decoder(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NdfdError> for firewx_common::FireWxError {
    fn from(err: NdfdError) -> Self {
        match err {
            NdfdError::Io(e) => firewx_common::FireWxError::Io(e),
            other => firewx_common::FireWxError::Grib2Error(other.to_string()),
        }
    }
}
