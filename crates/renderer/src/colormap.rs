//! Discrete colormaps for filled fields.
//!
//! A [`Colormap`] splits the value axis into bins at `levels` and gives each
//! bin one color, the way the filled plots and their colorbars read. Bin
//! colors come either from an explicit list or from [`ColorStop`] anchors
//! interpolated at each bin's midpoint.
//!
//! Styles can be loaded from JSON:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "colormaps": {
//!     "min_rh": {
//!       "name": "Minimum RH",
//!       "units": "%",
//!       "levels": [0, 10, 20, 30],
//!       "stops": [
//!         { "value": 0, "color": "#8c510a" },
//!         { "value": 30, "color": "#01665e" }
//!       ],
//!       "extend": "max"
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

pub type Rgba = [u8; 4];

/// Anchor color at a data value.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    pub value: f32,
    pub color: String,
    pub label: Option<String>,
}

impl ColorStop {
    pub fn new(value: f32, color: &str) -> Self {
        Self {
            value,
            color: color.to_string(),
            label: None,
        }
    }
}

/// Whether values beyond the outer levels are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extend {
    #[default]
    Neither,
    Min,
    Max,
    Both,
}

impl Extend {
    fn min(&self) -> bool {
        matches!(self, Extend::Min | Extend::Both)
    }

    fn max(&self) -> bool {
        matches!(self, Extend::Max | Extend::Both)
    }
}

/// Style file with named colormap definitions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    pub version: String,
    pub colormaps: HashMap<String, ColormapDefinition>,
}

/// A colormap as written in a style file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColormapDefinition {
    pub name: String,
    pub description: Option<String>,
    pub units: Option<String>,
    pub levels: Vec<f32>,
    /// One color per bin (`levels.len() - 1`)
    pub colors: Option<Vec<String>>,
    /// Anchors interpolated at bin midpoints when `colors` is absent
    pub stops: Option<Vec<ColorStop>>,
    #[serde(default)]
    pub extend: Extend,
    /// Colorbar tick values; defaults to every level
    pub ticks: Option<Vec<f32>>,
}

impl StyleConfig {
    pub fn from_json(json_str: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    pub fn from_file(path: &Path) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn colormap(&self, key: &str) -> RenderResult<Colormap> {
        let def = self
            .colormaps
            .get(key)
            .ok_or_else(|| RenderError::InvalidStyle(format!("no colormap named '{}'", key)))?;
        Colormap::from_definition(def)
    }
}

/// Level-binned colormap.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    pub name: String,
    pub units: String,
    /// Strictly increasing bin edges
    pub levels: Vec<f32>,
    /// `levels.len() - 1` bin colors
    pub colors: Vec<Rgba>,
    pub extend: Extend,
    pub ticks: Vec<f32>,
}

impl Colormap {
    /// Build from explicit bin colors.
    pub fn new(name: &str, units: &str, levels: Vec<f32>, colors: Vec<Rgba>, extend: Extend) -> RenderResult<Self> {
        if levels.len() < 2 {
            return Err(RenderError::InvalidStyle(format!(
                "{}: at least two levels are required",
                name
            )));
        }
        if levels.windows(2).any(|w| w[1] <= w[0]) {
            return Err(RenderError::InvalidStyle(format!(
                "{}: levels must be strictly increasing",
                name
            )));
        }
        if colors.len() != levels.len() - 1 {
            return Err(RenderError::InvalidStyle(format!(
                "{}: {} levels need {} colors, got {}",
                name,
                levels.len(),
                levels.len() - 1,
                colors.len()
            )));
        }

        Ok(Self {
            name: name.to_string(),
            units: units.to_string(),
            ticks: levels.clone(),
            levels,
            colors,
            extend,
        })
    }

    /// Build by sampling color stops at each bin midpoint.
    pub fn from_stops(
        name: &str,
        units: &str,
        levels: Vec<f32>,
        stops: &[ColorStop],
        extend: Extend,
    ) -> RenderResult<Self> {
        let anchors = parse_stops(name, stops)?;
        let colors = levels
            .windows(2)
            .map(|w| interpolate_stops(&anchors, (w[0] + w[1]) / 2.0))
            .collect();
        Self::new(name, units, levels, colors, extend)
    }

    pub fn from_definition(def: &ColormapDefinition) -> RenderResult<Self> {
        let units = def.units.as_deref().unwrap_or("");
        let mut cmap = match (&def.colors, &def.stops) {
            (Some(colors), _) => {
                let colors = colors
                    .iter()
                    .map(|c| {
                        hex_to_rgba(c).ok_or_else(|| {
                            RenderError::InvalidStyle(format!("{}: bad color '{}'", def.name, c))
                        })
                    })
                    .collect::<RenderResult<Vec<_>>>()?;
                Self::new(&def.name, units, def.levels.clone(), colors, def.extend)?
            }
            (None, Some(stops)) => {
                Self::from_stops(&def.name, units, def.levels.clone(), stops, def.extend)?
            }
            (None, None) => {
                return Err(RenderError::InvalidStyle(format!(
                    "{}: either colors or stops is required",
                    def.name
                )))
            }
        };
        if let Some(ticks) = &def.ticks {
            cmap.ticks = ticks.clone();
        }
        Ok(cmap)
    }

    pub fn with_ticks(mut self, ticks: Vec<f32>) -> Self {
        self.ticks = ticks;
        self
    }

    /// Bin index of a value, or None for NaN and unextended out-of-range values.
    pub fn classify(&self, value: f32) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let last = self.levels.len() - 1;
        if value < self.levels[0] {
            return self.extend.min().then_some(0);
        }
        if value > self.levels[last] {
            return self.extend.max().then_some(last - 1);
        }
        // Bins are [lo, hi) except the last, which includes its upper edge
        let bin = self.levels.partition_point(|&l| l <= value);
        Some(bin.saturating_sub(1).min(last - 1))
    }

    pub fn color_for(&self, value: f32) -> Option<Rgba> {
        self.classify(value).map(|i| self.colors[i])
    }

    pub fn num_bins(&self) -> usize {
        self.colors.len()
    }

    pub fn min(&self) -> f32 {
        self.levels[0]
    }

    pub fn max(&self) -> f32 {
        self.levels[self.levels.len() - 1]
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA`.
pub fn hex_to_rgba(hex: &str) -> Option<Rgba> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Some([channel(0)?, channel(2)?, channel(4)?, a])
}

fn parse_stops(name: &str, stops: &[ColorStop]) -> RenderResult<Vec<(f32, Rgba)>> {
    if stops.is_empty() {
        return Err(RenderError::InvalidStyle(format!("{}: no color stops", name)));
    }
    let mut anchors = stops
        .iter()
        .map(|s| {
            hex_to_rgba(&s.color)
                .map(|c| (s.value, c))
                .ok_or_else(|| RenderError::InvalidStyle(format!("{}: bad color '{}'", name, s.color)))
        })
        .collect::<RenderResult<Vec<_>>>()?;
    anchors.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(anchors)
}

fn interpolate_stops(anchors: &[(f32, Rgba)], value: f32) -> Rgba {
    let first = anchors[0];
    let last = anchors[anchors.len() - 1];
    if value <= first.0 {
        return first.1;
    }
    if value >= last.0 {
        return last.1;
    }

    let upper = anchors.partition_point(|a| a.0 <= value);
    let (v0, c0) = anchors[upper - 1];
    let (v1, c1) = anchors[upper];
    let t = if v1 > v0 { (value - v0) / (v1 - v0) } else { 0.0 };

    let mut out = [0u8; 4];
    for k in 0..4 {
        out[k] = (c0[k] as f32 + t * (c1[k] as f32 - c0[k] as f32)).round() as u8;
    }
    out
}

fn steps(start: f32, end: f32, step: f32) -> Vec<f32> {
    let n = ((end - start) / step).round() as usize;
    (0..=n).map(|k| start + k as f32 * step).collect()
}

fn stops(pairs: &[(f32, &str)]) -> Vec<ColorStop> {
    pairs.iter().map(|(v, c)| ColorStop::new(*v, c)).collect()
}

/// Built-in colormaps for the fire-weather products.
pub mod builtin {
    use super::*;

    fn build(name: &str, units: &str, levels: Vec<f32>, anchors: &[(f32, &str)], extend: Extend) -> RenderResult<Colormap> {
        Colormap::from_stops(name, units, levels, &stops(anchors), extend)
    }

    /// Fixed tables are well formed.
    fn table(name: &str, units: &str, levels: Vec<f32>, anchors: &[(f32, &str)], extend: Extend) -> Colormap {
        build(name, units, levels, anchors, extend)
            .unwrap_or_else(|e| unreachable!("built-in colormap {}: {}", name, e))
    }

    fn finite(name: &str, threshold: f32) -> RenderResult<f32> {
        if threshold.is_finite() {
            Ok(threshold)
        } else {
            Err(RenderError::InvalidStyle(format!(
                "{}: threshold must be finite, got {}",
                name, threshold
            )))
        }
    }

    /// 0-100% in 5% bins, brown (dry) to teal (moist).
    pub fn relative_humidity() -> Colormap {
        table(
            "Relative Humidity",
            "%",
            steps(0.0, 100.0, 5.0),
            &[
                (0.0, "#543005"),
                (20.0, "#bf812d"),
                (40.0, "#f6e8c3"),
                (60.0, "#c7eae5"),
                (80.0, "#35978f"),
                (100.0, "#003c30"),
            ],
            Extend::Neither,
        )
        .with_ticks(steps(0.0, 100.0, 10.0))
    }

    /// Color ramp up to the low minimum RH threshold, 1% bins.
    ///
    /// The ramp only colors values; callers mask out points above the
    /// threshold before filling.
    pub fn low_rh(threshold: f32) -> RenderResult<Colormap> {
        let top = finite("Low Minimum RH", threshold)?.max(1.0).ceil();
        Ok(build(
            "Low Minimum RH",
            "%",
            steps(0.0, top, 1.0),
            &[(0.0, "#67001f"), (top / 2.0, "#d6604d"), (top, "#fddbc7")],
            Extend::Min,
        )?
        .with_ticks(steps(0.0, top, (top / 5.0).ceil().max(1.0))))
    }

    /// Maximum RH up to the poor recovery threshold.
    pub fn poor_recovery(threshold: f32) -> RenderResult<Colormap> {
        let top = finite("Poor Overnight Recovery", threshold)?.max(1.0).ceil();
        Ok(build(
            "Poor Overnight Recovery",
            "%",
            steps(0.0, top, 2.0_f32.min(top)),
            &[(0.0, "#7f2704"), (top, "#fdae6b")],
            Extend::Min,
        )?
        .with_ticks(steps(0.0, top, (top / 5.0).ceil().max(1.0))))
    }

    /// Maximum RH from the excellent recovery threshold up.
    pub fn excellent_recovery(threshold: f32) -> RenderResult<Colormap> {
        let bottom = finite("Excellent Overnight Recovery", threshold)?.clamp(0.0, 99.0).floor();
        Ok(build(
            "Excellent Overnight Recovery",
            "%",
            steps(bottom, 100.0, 1.0),
            &[(bottom, "#c7e9c0"), (100.0, "#00441b")],
            Extend::Max,
        )?
        .with_ticks(steps(bottom, 100.0, ((100.0 - bottom) / 5.0).ceil().max(1.0))))
    }

    /// Temperature in degrees F, -20 to 120 in 5 degree bins.
    pub fn temperature() -> Colormap {
        table(
            "Temperature",
            "°F",
            steps(-20.0, 120.0, 5.0),
            &[
                (-20.0, "#3f007d"),
                (10.0, "#2166ac"),
                (32.0, "#92c5de"),
                (50.0, "#a6d96a"),
                (70.0, "#ffffbf"),
                (90.0, "#fdae61"),
                (105.0, "#d73027"),
                (120.0, "#67001f"),
            ],
            Extend::Both,
        )
        .with_ticks(steps(-20.0, 120.0, 10.0))
    }

    /// Temperatures from the extreme heat threshold up.
    pub fn extreme_heat(threshold: f32) -> RenderResult<Colormap> {
        let bottom = finite("Extreme Heat", threshold)?.floor();
        build(
            "Extreme Heat",
            "°F",
            steps(bottom, bottom + 20.0, 2.0),
            &[(bottom, "#fc9272"), (bottom + 10.0, "#cb181d"), (bottom + 20.0, "#49006a")],
            Extend::Max,
        )
    }

    /// Temperatures up to the frost threshold.
    pub fn frost_freeze(threshold: f32) -> RenderResult<Colormap> {
        let top = finite("Frost/Freeze", threshold)?.ceil();
        build(
            "Frost/Freeze",
            "°F",
            steps(top - 32.0, top, 4.0),
            &[(top - 32.0, "#08306b"), (top - 16.0, "#4292c6"), (top, "#deebf7")],
            Extend::Min,
        )
    }

    /// Day-to-day RH change, drying in browns and moistening in greens.
    pub fn rh_trend() -> Colormap {
        table(
            "RH Trend",
            "%",
            steps(-50.0, 50.0, 5.0),
            &[
                (-50.0, "#543005"),
                (-10.0, "#f6e8c3"),
                (0.0, "#f5f5f5"),
                (10.0, "#c7eae5"),
                (50.0, "#003c30"),
            ],
            Extend::Both,
        )
        .with_ticks(steps(-50.0, 50.0, 10.0))
    }

    /// Day-to-day temperature change, cooling in blues and warming in reds.
    pub fn temperature_trend() -> Colormap {
        table(
            "Temperature Trend",
            "°F",
            steps(-30.0, 30.0, 3.0),
            &[
                (-30.0, "#053061"),
                (-6.0, "#d1e5f0"),
                (0.0, "#f7f7f7"),
                (6.0, "#fddbc7"),
                (30.0, "#67001f"),
            ],
            Extend::Both,
        )
        .with_ticks(steps(-30.0, 30.0, 6.0))
    }

    /// Single class used for hazard mask fills.
    pub fn red_flag() -> Colormap {
        Colormap::new(
            "Red Flag",
            "",
            vec![0.5, 1.5],
            vec![[214, 39, 40, 255]],
            Extend::Neither,
        )
        .unwrap_or_else(|e| unreachable!("built-in colormap red_flag: {}", e))
        .with_ticks(vec![])
    }
}
