//! NDFD parameter files and where they live.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DownloadError;

/// Operational NDFD GRIB2 tree on tgftp.
pub const DEFAULT_BASE_URL: &str = "https://tgftp.nws.noaa.gov/SL.us008001/ST.opnl/DF.gr2/DC.ndfd";

/// Valid-period directories: days 1-3, then days 4-7.
const PERIODS: [&str; 2] = ["VP.001-003", "VP.004-007"];

/// An NDFD parameter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NdfdProduct {
    MaxRh,
    MinRh,
    MaxT,
    MinT,
    Rh,
    WindSpeed,
    WindGust,
}

impl NdfdProduct {
    pub const ALL: [NdfdProduct; 7] = [
        NdfdProduct::MaxRh,
        NdfdProduct::MinRh,
        NdfdProduct::MaxT,
        NdfdProduct::MinT,
        NdfdProduct::Rh,
        NdfdProduct::WindSpeed,
        NdfdProduct::WindGust,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            NdfdProduct::MaxRh => "ds.maxrh.bin",
            NdfdProduct::MinRh => "ds.minrh.bin",
            NdfdProduct::MaxT => "ds.maxt.bin",
            NdfdProduct::MinT => "ds.mint.bin",
            NdfdProduct::Rh => "ds.rhm.bin",
            NdfdProduct::WindSpeed => "ds.wspd.bin",
            NdfdProduct::WindGust => "ds.wgust.bin",
        }
    }

    /// Field name the parser assigns to grids of this file.
    pub fn field_name(&self) -> &'static str {
        match self {
            NdfdProduct::MaxRh => "MaxRH",
            NdfdProduct::MinRh => "MinRH",
            NdfdProduct::MaxT => "MaxT",
            NdfdProduct::MinT => "MinT",
            NdfdProduct::Rh => "RH",
            NdfdProduct::WindSpeed => "WindSpd",
            NdfdProduct::WindGust => "WindGust",
        }
    }

    /// Period directories, short term first.
    pub fn periods(&self) -> &'static [&'static str] {
        &PERIODS
    }

    /// `{base}/AR.{sector}/{period}/{file}`
    pub fn url(&self, base_url: &str, sector: &str, period: &str) -> String {
        format!(
            "{}/AR.{}/{}/{}",
            base_url.trim_end_matches('/'),
            sector,
            period,
            self.file_name()
        )
    }

    /// Cache file name; sector and period keep files from colliding.
    pub fn cache_name(&self, sector: &str, period: &str) -> String {
        format!("{}_{}_{}", sector, period.replace('.', ""), self.file_name())
    }
}

impl fmt::Display for NdfdProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for NdfdProduct {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let key = key
            .strip_prefix("ds.")
            .unwrap_or(&key)
            .trim_end_matches(".bin")
            .to_string();
        match key.as_str() {
            "maxrh" => Ok(NdfdProduct::MaxRh),
            "minrh" => Ok(NdfdProduct::MinRh),
            "maxt" => Ok(NdfdProduct::MaxT),
            "mint" => Ok(NdfdProduct::MinT),
            "rh" | "rhm" => Ok(NdfdProduct::Rh),
            "wspd" | "wind" => Ok(NdfdProduct::WindSpeed),
            "wgust" | "gust" => Ok(NdfdProduct::WindGust),
            _ => Err(DownloadError::UnknownProduct(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let url = NdfdProduct::MaxRh.url(DEFAULT_BASE_URL, "pacswest", "VP.001-003");
        assert_eq!(
            url,
            "https://tgftp.nws.noaa.gov/SL.us008001/ST.opnl/DF.gr2/DC.ndfd/AR.pacswest/VP.001-003/ds.maxrh.bin"
        );
    }

    #[test]
    fn test_url_trailing_slash() {
        let url = NdfdProduct::WindGust.url("http://localhost:8080/", "conus", "VP.004-007");
        assert_eq!(url, "http://localhost:8080/AR.conus/VP.004-007/ds.wgust.bin");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("ds.minrh.bin".parse::<NdfdProduct>().unwrap(), NdfdProduct::MinRh);
        assert_eq!("WSPD".parse::<NdfdProduct>().unwrap(), NdfdProduct::WindSpeed);
        assert_eq!("rhm".parse::<NdfdProduct>().unwrap(), NdfdProduct::Rh);
        assert!("qpf".parse::<NdfdProduct>().is_err());
    }

    #[test]
    fn test_cache_name_unique_per_period() {
        let a = NdfdProduct::MaxT.cache_name("conus", "VP.001-003");
        let b = NdfdProduct::MaxT.cache_name("conus", "VP.004-007");
        assert_ne!(a, b);
        assert_eq!(a, "conus_VP001-003_ds.maxt.bin");
    }
}
