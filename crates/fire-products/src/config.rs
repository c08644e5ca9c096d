//! Configuration for the plotter.

use std::path::{Path, PathBuf};

use firewx_common::{FireWxError, FireWxResult};
use ndfd_download::{DownloadConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

/// Product thresholds. RH in percent, temperatures in °F, wind in MPH.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub low_rh: f32,
    pub poor_recovery: f32,
    pub excellent_recovery: f32,
    pub extreme_heat_f: f32,
    pub frost_f: f32,
    pub critical_rh: f32,
    pub critical_wind_mph: f32,
    pub critical_gust_mph: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_rh: 15.0,
            poor_recovery: 30.0,
            excellent_recovery: 80.0,
            extreme_heat_f: 100.0,
            frost_f: 32.0,
            critical_rh: 15.0,
            critical_wind_mph: 20.0,
            critical_gust_mph: 25.0,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> FireWxResult<()> {
        for (name, rh) in [
            ("low_rh", self.low_rh),
            ("poor_recovery", self.poor_recovery),
            ("excellent_recovery", self.excellent_recovery),
            ("critical_rh", self.critical_rh),
        ] {
            if !(1.0..=100.0).contains(&rh) {
                return Err(FireWxError::ConfigError(format!(
                    "{} must be within 1-100%, got {}",
                    name, rh
                )));
            }
        }
        // The excellent recovery scale runs from the threshold up to 100
        if self.excellent_recovery >= 100.0 {
            return Err(FireWxError::ConfigError(
                "excellent_recovery must be below 100%".to_string(),
            ));
        }
        for (name, wind) in [
            ("critical_wind_mph", self.critical_wind_mph),
            ("critical_gust_mph", self.critical_gust_mph),
        ] {
            if !wind.is_finite() || wind < 0.0 {
                return Err(FireWxError::ConfigError(format!(
                    "{} must be >= 0, got {}",
                    name, wind
                )));
            }
        }
        if !self.extreme_heat_f.is_finite() || !self.frost_f.is_finite() {
            return Err(FireWxError::ConfigError(
                "temperature thresholds must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the plotter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotterConfig {
    /// Root of the output tree.
    pub output_dir: PathBuf,

    /// Directory of pre-downloaded `ds.*.bin` files; read before downloading.
    pub data_dir: Option<PathBuf>,

    /// Directory of GeoJSON boundary layers (`states.geojson`, ...).
    pub boundaries_dir: PathBuf,

    /// TrueType font for figure text; system fonts are tried when unset.
    pub font: Option<PathBuf>,

    /// Extra region definitions merged over the built-in catalog.
    pub regions_file: Option<PathBuf>,

    /// JPEG quality (1-100).
    pub jpeg_quality: u8,

    /// Delay between GIF frames in milliseconds.
    pub gif_delay_ms: u32,

    /// Maximum number of forecast periods per product.
    pub max_periods: usize,

    pub ndfd_base_url: String,

    /// Download cache directory.
    pub cache_dir: PathBuf,

    pub download_retries: u32,

    pub thresholds: Thresholds,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            data_dir: None,
            boundaries_dir: PathBuf::from("boundaries"),
            font: None,
            regions_file: None,
            jpeg_quality: 90,
            gif_delay_ms: 1000,
            max_periods: 7,
            ndfd_base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: std::env::temp_dir().join("firewx-ndfd"),
            download_retries: 4,
            thresholds: Thresholds::default(),
        }
    }
}

impl PlotterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load a YAML file, then apply environment overrides.
    pub fn from_file(path: &Path) -> FireWxResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&text).map_err(|e| {
            FireWxError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("FIREWX_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("FIREWX_DATA_DIR") {
            if !val.is_empty() {
                self.data_dir = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("FIREWX_BOUNDARIES_DIR") {
            self.boundaries_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("FIREWX_FONT") {
            if !val.is_empty() {
                self.font = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("FIREWX_REGIONS_FILE") {
            if !val.is_empty() {
                self.regions_file = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("FIREWX_JPEG_QUALITY") {
            if let Ok(q) = val.parse() {
                self.jpeg_quality = q;
            }
        }

        if let Ok(val) = std::env::var("FIREWX_GIF_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                self.gif_delay_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("FIREWX_NDFD_BASE_URL") {
            self.ndfd_base_url = val;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> FireWxResult<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(FireWxError::ConfigError(
                "jpeg_quality must be 1-100".to_string(),
            ));
        }

        if self.gif_delay_ms == 0 {
            return Err(FireWxError::ConfigError(
                "gif_delay_ms must be > 0".to_string(),
            ));
        }

        if self.max_periods == 0 {
            return Err(FireWxError::ConfigError(
                "max_periods must be > 0".to_string(),
            ));
        }

        if !self.ndfd_base_url.starts_with("http://") && !self.ndfd_base_url.starts_with("https://") {
            return Err(FireWxError::ConfigError(format!(
                "ndfd_base_url must be an http(s) URL, got '{}'",
                self.ndfd_base_url
            )));
        }

        self.thresholds.validate()
    }

    /// Settings for the NDFD download manager.
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            base_url: self.ndfd_base_url.clone(),
            cache_dir: self.cache_dir.clone(),
            max_retries: self.download_retries,
            ..DownloadConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlotterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!(config.thresholds.critical_gust_mph, 25.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PlotterConfig {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.jpeg_quality = 80;
        config.ndfd_base_url = "ftp://example".to_string();
        assert!(config.validate().is_err());

        config.ndfd_base_url = DEFAULT_BASE_URL.to_string();
        config.thresholds.low_rh = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firewx.yaml");
        std::fs::write(
            &path,
            "gif_delay_ms: 500\nthresholds:\n  critical_rh: 10\n",
        )
        .unwrap();

        let config = PlotterConfig::from_file(&path).unwrap();
        assert_eq!(config.thresholds.critical_rh, 10.0);
        assert_eq!(config.thresholds.low_rh, 15.0);
        assert_eq!(config.max_periods, 7);
    }

    #[test]
    fn test_download_config_carries_base_url() {
        let config = PlotterConfig {
            ndfd_base_url: "http://127.0.0.1:9/ndfd".to_string(),
            download_retries: 1,
            ..Default::default()
        };
        let dl = config.download_config();
        assert_eq!(dl.base_url, "http://127.0.0.1:9/ndfd");
        assert_eq!(dl.max_retries, 1);
    }
}
