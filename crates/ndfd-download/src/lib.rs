//! Downloads NDFD GRIB2 files from the NWS telecommunication gateway.
//!
//! NDFD publishes each parameter as `ds.{param}.bin` under one directory per
//! sector and valid-period range:
//!
//! ```text
//! {base}/AR.{sector}/VP.001-003/ds.maxrh.bin
//! {base}/AR.{sector}/VP.004-007/ds.maxrh.bin
//! ```
//!
//! [`DownloadManager`] fetches those files with retry and exponential
//! backoff, keeps a local cache, and hands back the concatenated bytes of a
//! product's period files.

pub mod error;
pub mod manager;
pub mod product;

pub use error::{DownloadError, DownloadResult};
pub use manager::{DownloadConfig, DownloadManager};
pub use product::{NdfdProduct, DEFAULT_BASE_URL};
