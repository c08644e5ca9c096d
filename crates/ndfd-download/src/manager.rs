//! Download manager with retry logic and a file cache.
//!
//! Key features:
//! - Exponential backoff retry on failures (404 is not retried)
//! - Streaming to a `.partial` file that is renamed once complete
//! - File integrity verification via Content-Length
//! - Cached files reused while younger than `max_age`

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::{header, Client, StatusCode};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::error::{DownloadError, DownloadResult};
use crate::product::{NdfdProduct, DEFAULT_BASE_URL};

/// Configuration for the download manager.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub base_url: String,
    /// Directory for downloaded files
    pub cache_dir: PathBuf,
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Reuse cached files younger than this
    pub max_age: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: std::env::temp_dir().join("firewx-ndfd"),
            max_retries: 4,
            initial_retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(60),
            request_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            // NDFD updates roughly every half hour
            max_age: Duration::from_secs(30 * 60),
        }
    }
}

/// Fetches NDFD files over HTTP.
pub struct DownloadManager {
    client: Client,
    config: DownloadConfig,
}

impl DownloadManager {
    pub fn new(config: DownloadConfig) -> DownloadResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .user_agent(concat!("firewx-plotter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Download every period file of a product and return their bytes
    /// concatenated, short term first.
    ///
    /// A missing later period is skipped; the call fails only when no
    /// period could be fetched.
    #[instrument(skip(self), fields(product = %product))]
    pub async fn fetch_product(&self, sector: &str, product: NdfdProduct) -> DownloadResult<Bytes> {
        let mut combined = BytesMut::new();
        let mut fetched = 0;

        for period in product.periods() {
            match self.fetch_file(sector, product, period).await {
                Ok(path) => {
                    let data = fs::read(&path).await?;
                    debug!(period = %period, bytes = data.len(), "Read period file");
                    combined.extend_from_slice(&data);
                    fetched += 1;
                }
                Err(e) if e.is_not_found() => {
                    warn!(period = %period, sector = %sector, "Period file not published, skipping");
                }
                Err(e) => return Err(e),
            }
        }

        if fetched == 0 {
            return Err(DownloadError::NoData {
                product: product.to_string(),
                sector: sector.to_string(),
            });
        }

        info!(
            sector = %sector,
            periods = fetched,
            bytes = combined.len(),
            "Fetched NDFD product"
        );
        Ok(combined.freeze())
    }

    /// Fetch one period file into the cache and return its path.
    pub async fn fetch_file(
        &self,
        sector: &str,
        product: NdfdProduct,
        period: &str,
    ) -> DownloadResult<PathBuf> {
        let url = product.url(&self.config.base_url, sector, period);
        let path = self.config.cache_dir.join(product.cache_name(sector, period));

        if self.is_fresh(&path).await {
            info!(path = %path.display(), "Using cached file");
            return Ok(path);
        }

        self.download(&url, &path).await?;
        Ok(path)
    }

    /// Whether a cached file exists and is younger than `max_age`.
    async fn is_fresh(&self, path: &Path) -> bool {
        let Ok(metadata) = fs::metadata(path).await else {
            return false;
        };
        if metadata.len() == 0 {
            return false;
        }
        metadata
            .modified()
            .ok()
            .and_then(|m| SystemTime::now().duration_since(m).ok())
            .map(|age| age < self.config.max_age)
            .unwrap_or(false)
    }

    /// Download a URL to a path with automatic retry.
    #[instrument(skip(self, path), fields(url = %url))]
    pub async fn download(&self, url: &str, path: &Path) -> DownloadResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = partial_path(path);
        let mut retry_count = 0;
        let mut delay = self.config.initial_retry_delay;

        loop {
            match self.download_once(url, &temp_path).await {
                Ok(bytes) => {
                    fs::rename(&temp_path, path).await?;
                    info!(path = %path.display(), bytes, "Download completed");
                    return Ok(());
                }
                Err(e) => {
                    fs::remove_file(&temp_path).await.ok();

                    if e.is_not_found() {
                        return Err(e);
                    }

                    retry_count += 1;
                    if retry_count > self.config.max_retries {
                        return Err(DownloadError::RetriesExhausted {
                            url: url.to_string(),
                            attempts: retry_count,
                            last_error: e.to_string(),
                        });
                    }

                    warn!(
                        error = %e,
                        retry = retry_count,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Download failed, retrying"
                    );

                    tokio::time::sleep(delay).await;

                    // Exponential backoff
                    delay = std::cmp::min(delay * 2, self.config.max_retry_delay);
                }
            }
        }
    }

    /// One GET streamed to `temp_path`; returns the byte count.
    async fn download_once(&self, url: &str, temp_path: &Path) -> DownloadResult<u64> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let expected: Option<u64> = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        let mut file = File::create(temp_path).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;

        if let Some(expected) = expected {
            if written != expected {
                return Err(DownloadError::SizeMismatch {
                    expected,
                    actual: written,
                });
            }
        }

        debug!(bytes = written, total = ?expected, "Streamed response body");
        Ok(written)
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path() {
        let p = partial_path(Path::new("/data/conus_VP001-003_ds.maxrh.bin"));
        assert_eq!(p, PathBuf::from("/data/conus_VP001-003_ds.maxrh.bin.partial"));
    }

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.initial_retry_delay < config.max_retry_delay);
    }

    #[test]
    fn test_cached_file_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cached.bin");
        std::fs::write(&path, b"GRIB").unwrap();

        let manager = DownloadManager::new(DownloadConfig {
            cache_dir: dir.path().to_path_buf(),
            ..DownloadConfig::default()
        })
        .unwrap();

        assert!(tokio_test::block_on(manager.is_fresh(&path)));
        assert!(!tokio_test::block_on(manager.is_fresh(&dir.path().join("missing.bin"))));
    }

    #[test]
    fn test_empty_cached_file_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();

        let manager = DownloadManager::new(DownloadConfig::default()).unwrap();
        assert!(!tokio_test::block_on(manager.is_fresh(&path)));
    }
}
