//! The plot products and their static metadata.

use std::fmt;
use std::str::FromStr;

use firewx_common::{FireWxError, FireWxResult, UnitConversion};
use ndfd_download::NdfdProduct;
use renderer::{builtin, Colormap};
use serde::{Deserialize, Serialize};

use crate::config::Thresholds;
use crate::mask::Comparison;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    RelativeHumidity,
    Temperature,
    CriticalFireWeather,
}

impl ProductCategory {
    pub fn dir_name(&self) -> &'static str {
        match self {
            ProductCategory::RelativeHumidity => "Relative Humidity",
            ProductCategory::Temperature => "Temperature",
            ProductCategory::CriticalFireWeather => "Critical Fire Weather",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Product {
    MinRh,
    MaxRh,
    LowMinRh,
    PoorRecovery,
    ExcellentRecovery,
    MinRhTrend,
    MaxRhTrend,
    MaxT,
    MinT,
    ExtremeHeat,
    FrostFreeze,
    MaxTTrend,
    MinTTrend,
    DryAndWindy,
    DryAndGusty,
}

/// How a product turns its input grids into frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rendering {
    /// Fill one field through a colormap.
    Field,
    /// Fill one field only where `value cmp threshold` holds.
    Threshold { cmp: Comparison, threshold: f32 },
    /// Fill the difference between successive grids of one field.
    Trend,
    /// Shade where RH and a wind field both cross their thresholds.
    DryAndWind {
        wind: NdfdProduct,
        rh_threshold: f32,
        wind_threshold: f32,
    },
}

impl Product {
    pub const ALL: [Product; 15] = [
        Product::MinRh,
        Product::MaxRh,
        Product::LowMinRh,
        Product::PoorRecovery,
        Product::ExcellentRecovery,
        Product::MinRhTrend,
        Product::MaxRhTrend,
        Product::MaxT,
        Product::MinT,
        Product::ExtremeHeat,
        Product::FrostFreeze,
        Product::MaxTTrend,
        Product::MinTTrend,
        Product::DryAndWindy,
        Product::DryAndGusty,
    ];

    /// Command-line name.
    pub fn key(&self) -> &'static str {
        match self {
            Product::MinRh => "min-rh",
            Product::MaxRh => "max-rh",
            Product::LowMinRh => "low-min-rh",
            Product::PoorRecovery => "poor-recovery",
            Product::ExcellentRecovery => "excellent-recovery",
            Product::MinRhTrend => "min-rh-trend",
            Product::MaxRhTrend => "max-rh-trend",
            Product::MaxT => "max-t",
            Product::MinT => "min-t",
            Product::ExtremeHeat => "extreme-heat",
            Product::FrostFreeze => "frost-freeze",
            Product::MaxTTrend => "max-t-trend",
            Product::MinTTrend => "min-t-trend",
            Product::DryAndWindy => "dry-and-windy",
            Product::DryAndGusty => "dry-and-gusty",
        }
    }

    pub fn category(&self) -> ProductCategory {
        match self {
            Product::MinRh
            | Product::MaxRh
            | Product::LowMinRh
            | Product::PoorRecovery
            | Product::ExcellentRecovery
            | Product::MinRhTrend
            | Product::MaxRhTrend => ProductCategory::RelativeHumidity,
            Product::MaxT
            | Product::MinT
            | Product::ExtremeHeat
            | Product::FrostFreeze
            | Product::MaxTTrend
            | Product::MinTTrend => ProductCategory::Temperature,
            Product::DryAndWindy | Product::DryAndGusty => ProductCategory::CriticalFireWeather,
        }
    }

    /// Output directory and GIF name.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Product::MinRh => "Minimum RH",
            Product::MaxRh => "Maximum RH",
            Product::LowMinRh => "Low Minimum RH",
            Product::PoorRecovery => "Poor Overnight Recovery",
            Product::ExcellentRecovery => "Excellent Overnight Recovery",
            Product::MinRhTrend => "Minimum RH Trend",
            Product::MaxRhTrend => "Maximum RH Trend",
            Product::MaxT => "Maximum Temperature",
            Product::MinT => "Minimum Temperature",
            Product::ExtremeHeat => "Extreme Heat",
            Product::FrostFreeze => "Frost Freeze",
            Product::MaxTTrend => "Maximum Temperature Trend",
            Product::MinTTrend => "Minimum Temperature Trend",
            Product::DryAndWindy => "Dry and Windy",
            Product::DryAndGusty => "Dry and Gusty",
        }
    }

    /// The NDFD file holding the product's primary field.
    pub fn source(&self) -> NdfdProduct {
        match self {
            Product::MinRh | Product::LowMinRh | Product::MinRhTrend => NdfdProduct::MinRh,
            Product::MaxRh
            | Product::PoorRecovery
            | Product::ExcellentRecovery
            | Product::MaxRhTrend => NdfdProduct::MaxRh,
            Product::MaxT | Product::ExtremeHeat | Product::MaxTTrend => NdfdProduct::MaxT,
            Product::MinT | Product::FrostFreeze | Product::MinTTrend => NdfdProduct::MinT,
            Product::DryAndWindy | Product::DryAndGusty => NdfdProduct::Rh,
        }
    }

    /// Every NDFD file needed, primary first.
    pub fn inputs(&self) -> Vec<NdfdProduct> {
        match self {
            Product::DryAndWindy => vec![NdfdProduct::Rh, NdfdProduct::WindSpeed],
            Product::DryAndGusty => vec![NdfdProduct::Rh, NdfdProduct::WindGust],
            other => vec![other.source()],
        }
    }

    /// Conversion from the NDFD native unit for display.
    pub fn conversion(&self) -> UnitConversion {
        match self.category() {
            ProductCategory::Temperature => UnitConversion::KelvinToFahrenheit,
            _ => UnitConversion::None,
        }
    }

    pub fn rendering(&self, t: &Thresholds) -> Rendering {
        match self {
            Product::MinRhTrend | Product::MaxRhTrend | Product::MaxTTrend | Product::MinTTrend => {
                Rendering::Trend
            }
            Product::DryAndWindy => Rendering::DryAndWind {
                wind: NdfdProduct::WindSpeed,
                rh_threshold: t.critical_rh,
                wind_threshold: t.critical_wind_mph,
            },
            Product::DryAndGusty => Rendering::DryAndWind {
                wind: NdfdProduct::WindGust,
                rh_threshold: t.critical_rh,
                wind_threshold: t.critical_gust_mph,
            },
            Product::LowMinRh => Rendering::Threshold {
                cmp: Comparison::AtOrBelow,
                threshold: t.low_rh,
            },
            Product::PoorRecovery => Rendering::Threshold {
                cmp: Comparison::AtOrBelow,
                threshold: t.poor_recovery,
            },
            Product::ExcellentRecovery => Rendering::Threshold {
                cmp: Comparison::AtOrAbove,
                threshold: t.excellent_recovery,
            },
            Product::ExtremeHeat => Rendering::Threshold {
                cmp: Comparison::AtOrAbove,
                threshold: t.extreme_heat_f,
            },
            Product::FrostFreeze => Rendering::Threshold {
                cmp: Comparison::AtOrBelow,
                threshold: t.frost_f,
            },
            Product::MinRh | Product::MaxRh | Product::MaxT | Product::MinT => Rendering::Field,
        }
    }

    /// Colormap for field and trend products; the mask color for hazards.
    ///
    /// Threshold products get a ramp over the shaded side only; which points
    /// are shaded is decided by [`Rendering::Threshold`].
    pub fn colormap(&self, t: &Thresholds) -> FireWxResult<Colormap> {
        let cmap = match self {
            Product::MinRh | Product::MaxRh => builtin::relative_humidity(),
            Product::LowMinRh => builtin::low_rh(t.low_rh)?,
            Product::PoorRecovery => builtin::poor_recovery(t.poor_recovery)?,
            Product::ExcellentRecovery => builtin::excellent_recovery(t.excellent_recovery)?,
            Product::MinRhTrend | Product::MaxRhTrend => builtin::rh_trend(),
            Product::MaxT | Product::MinT => builtin::temperature(),
            Product::ExtremeHeat => builtin::extreme_heat(t.extreme_heat_f)?,
            Product::FrostFreeze => builtin::frost_freeze(t.frost_f)?,
            Product::MaxTTrend | Product::MinTTrend => builtin::temperature_trend(),
            Product::DryAndWindy | Product::DryAndGusty => builtin::red_flag(),
        };
        Ok(cmap)
    }

    /// Threshold comparison shown in titles, if the product has one.
    fn criterion(&self, t: &Thresholds) -> Option<String> {
        let rule = |label: &str, cmp: Comparison, value: f32, unit: &str| {
            format!("{} {} {}{}", label, cmp, value, unit)
        };
        match self {
            Product::LowMinRh => Some(rule("RH", Comparison::AtOrBelow, t.low_rh, "%")),
            Product::PoorRecovery => Some(rule("RH", Comparison::AtOrBelow, t.poor_recovery, "%")),
            Product::ExcellentRecovery => {
                Some(rule("RH", Comparison::AtOrAbove, t.excellent_recovery, "%"))
            }
            Product::ExtremeHeat => Some(rule("Temperature", Comparison::AtOrAbove, t.extreme_heat_f, "°F")),
            Product::FrostFreeze => Some(rule("Temperature", Comparison::AtOrBelow, t.frost_f, "°F")),
            Product::DryAndWindy => Some(format!(
                "{} & {}",
                rule("RH", Comparison::AtOrBelow, t.critical_rh, "%"),
                rule("Sustained Wind", Comparison::AtOrAbove, t.critical_wind_mph, " MPH")
            )),
            Product::DryAndGusty => Some(format!(
                "{} & {}",
                rule("RH", Comparison::AtOrBelow, t.critical_rh, "%"),
                rule("Wind Gust", Comparison::AtOrAbove, t.critical_gust_mph, " MPH")
            )),
            _ => None,
        }
    }

    /// Figure title.
    pub fn title(&self, region_name: &str, t: &Thresholds) -> String {
        let base = match self {
            Product::MinRh => "Minimum Relative Humidity",
            Product::MaxRh => "Maximum Relative Humidity",
            Product::LowMinRh => "Low Minimum Relative Humidity",
            Product::PoorRecovery => "Poor Overnight RH Recovery",
            Product::ExcellentRecovery => "Excellent Overnight RH Recovery",
            Product::MinRhTrend => "24-Hour Minimum RH Trend",
            Product::MaxRhTrend => "24-Hour Maximum RH Trend",
            Product::MaxT => "Maximum Temperature",
            Product::MinT => "Minimum Temperature",
            Product::ExtremeHeat => "Extreme Heat",
            Product::FrostFreeze => "Frost/Freeze",
            Product::MaxTTrend => "24-Hour Maximum Temperature Trend",
            Product::MinTTrend => "24-Hour Minimum Temperature Trend",
            Product::DryAndWindy => "Dry & Windy Areas",
            Product::DryAndGusty => "Dry & Gusty Areas",
        };
        match self.criterion(t) {
            Some(c) => format!("{} {} ({})", region_name, base, c),
            None => format!("{} {}", region_name, base),
        }
    }

    /// Colorbar caption.
    pub fn colorbar_caption(&self, t: &Thresholds) -> String {
        match self.category() {
            ProductCategory::RelativeHumidity => "Relative Humidity (%)".to_string(),
            ProductCategory::Temperature => "Temperature (°F)".to_string(),
            ProductCategory::CriticalFireWeather => self.criterion(t).unwrap_or_default(),
        }
    }

    /// Whether frames carry station value labels.
    pub fn has_station_labels(&self) -> bool {
        self.category() != ProductCategory::CriticalFireWeather
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Product {
    type Err = FireWxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Product::ALL
            .iter()
            .copied()
            .find(|p| p.key() == key)
            .ok_or_else(|| FireWxError::ConfigError(format!("unknown product '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for product in Product::ALL {
            assert_eq!(product.key().parse::<Product>().unwrap(), product);
        }
        assert_eq!("DRY_AND_WINDY".parse::<Product>().unwrap(), Product::DryAndWindy);
        assert!("fog".parse::<Product>().is_err());
    }

    #[test]
    fn test_inputs() {
        assert_eq!(Product::MinRhTrend.inputs(), vec![NdfdProduct::MinRh]);
        assert_eq!(
            Product::DryAndGusty.inputs(),
            vec![NdfdProduct::Rh, NdfdProduct::WindGust]
        );
    }

    #[test]
    fn test_titles_include_thresholds() {
        let t = Thresholds::default();
        assert_eq!(
            Product::DryAndWindy.title("California", &t),
            "California Dry & Windy Areas (RH <= 15% & Sustained Wind >= 20 MPH)"
        );
        assert_eq!(Product::MinRh.title("CONUS", &t), "CONUS Minimum Relative Humidity");
        assert_eq!(
            Product::ExtremeHeat.title("AZ", &t),
            "AZ Extreme Heat (Temperature >= 100°F)"
        );
    }

    #[test]
    fn test_threshold_products_compare_against_thresholds() {
        let t = Thresholds {
            low_rh: 12.5,
            extreme_heat_f: 104.5,
            ..Thresholds::default()
        };
        assert_eq!(
            Product::LowMinRh.rendering(&t),
            Rendering::Threshold {
                cmp: Comparison::AtOrBelow,
                threshold: 12.5
            }
        );
        assert_eq!(
            Product::ExtremeHeat.rendering(&t),
            Rendering::Threshold {
                cmp: Comparison::AtOrAbove,
                threshold: 104.5
            }
        );
        assert_eq!(Product::MaxT.rendering(&t), Rendering::Field);
        assert_eq!(Product::MinTTrend.rendering(&t), Rendering::Trend);
    }

    #[test]
    fn test_colormap_rejects_non_finite_threshold() {
        let t = Thresholds {
            frost_f: f32::NAN,
            ..Thresholds::default()
        };
        assert!(Product::FrostFreeze.colormap(&t).is_err());
        assert!(Product::MinT.colormap(&t).is_ok());
    }

    #[test]
    fn test_temperature_products_convert() {
        assert_eq!(Product::FrostFreeze.conversion(), UnitConversion::KelvinToFahrenheit);
        assert_eq!(Product::MinRh.conversion(), UnitConversion::None);
    }
}
