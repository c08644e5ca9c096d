use firewx_common::FireWxError;
use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid canvas size {width}x{height}")]
    Canvas { width: u32, height: u32 },

    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    #[error("Invalid boundary data: {0}")]
    Boundary(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for FireWxError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(e) => FireWxError::Io(e),
            other => FireWxError::RenderError(other.to_string()),
        }
    }
}
