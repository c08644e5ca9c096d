use firewx_common::FireWxError;
use thiserror::Error;

pub type DownloadResult<T> = Result<T, DownloadError>;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Download size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("Download of {url} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("No period files available for {product} in sector {sector}")]
    NoData { product: String, sector: String },

    #[error("Unknown NDFD product: {0}")]
    UnknownProduct(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Missing files are not worth retrying.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DownloadError::Status { status: 404, .. })
    }
}

impl From<DownloadError> for FireWxError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::Io(e) => FireWxError::Io(e),
            DownloadError::NoData { .. } => FireWxError::DataNotAvailable(err.to_string()),
            other => FireWxError::DownloadError(other.to_string()),
        }
    }
}
