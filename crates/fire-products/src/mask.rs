//! Threshold masks and grid differences.
//!
//! A mask flags the grid points where every comparison holds. Missing
//! values never satisfy a comparison, so NaN points are always `false`.

use std::fmt;

use firewx_common::{FireWxError, FireWxResult};
use ndfd_parser::{ForecastGrid, GridGeometry};
use serde::{Deserialize, Serialize};

/// How a grid value is compared against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtOrBelow,
    AtOrAbove,
}

impl Comparison {
    pub fn holds(&self, value: f32, threshold: f32) -> bool {
        match self {
            Comparison::AtOrBelow => value <= threshold,
            Comparison::AtOrAbove => value >= threshold,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::AtOrBelow => "<=",
            Comparison::AtOrAbove => ">=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean grid in the layout of the grids it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdMask {
    pub width: usize,
    pub height: usize,
    pub values: Vec<bool>,
    pub geometry: GridGeometry,
}

impl ThresholdMask {
    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, i: usize, j: usize) -> Option<bool> {
        if i >= self.width || j >= self.height {
            return None;
        }
        self.values.get(j * self.width + i).copied()
    }

    /// Nearest grid point's flag; None off the grid.
    pub fn value_at(&self, lat: f64, lon: f64) -> Option<bool> {
        self.geometry
            .grid_index(lat, lon)
            .and_then(|(i, j)| self.get(i, j))
    }

    /// Number of flagged points.
    pub fn count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }

    pub fn any(&self) -> bool {
        self.values.iter().any(|&v| v)
    }

    /// Logical AND with another mask of the same shape.
    pub fn and(&self, other: &ThresholdMask) -> FireWxResult<ThresholdMask> {
        check_shape(self.shape(), other.shape())?;
        Ok(ThresholdMask {
            width: self.width,
            height: self.height,
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| a && b)
                .collect(),
            geometry: self.geometry.clone(),
        })
    }
}

fn check_shape(expected: (usize, usize), actual: (usize, usize)) -> FireWxResult<()> {
    if expected != actual {
        return Err(FireWxError::ShapeMismatch { expected, actual });
    }
    Ok(())
}

/// Flag points where `grid cmp threshold`.
pub fn threshold_mask(grid: &ForecastGrid, cmp: Comparison, threshold: f32) -> ThresholdMask {
    ThresholdMask {
        width: grid.width,
        height: grid.height,
        values: grid
            .values
            .iter()
            .map(|&v| !v.is_nan() && cmp.holds(v, threshold))
            .collect(),
        geometry: grid.geometry.clone(),
    }
}

/// Copy of `grid` with every point outside `threshold_mask` set missing.
///
/// Filling the result through a colormap shades exactly the masked points.
pub fn masked_field(grid: &ForecastGrid, cmp: Comparison, threshold: f32) -> ForecastGrid {
    let mask = threshold_mask(grid, cmp, threshold);
    let mut out = grid.clone();
    for (v, &keep) in out.values.iter_mut().zip(&mask.values) {
        if !keep {
            *v = f32::NAN;
        }
    }
    out
}

/// Flag points where both comparisons hold.
pub fn combined_mask(
    a: &ForecastGrid,
    cmp_a: Comparison,
    threshold_a: f32,
    b: &ForecastGrid,
    cmp_b: Comparison,
    threshold_b: f32,
) -> FireWxResult<ThresholdMask> {
    check_shape(a.shape(), b.shape())?;
    threshold_mask(a, cmp_a, threshold_a).and(&threshold_mask(b, cmp_b, threshold_b))
}

/// Elementwise `later - earlier`, carrying the later grid's window.
///
/// A point missing in either grid is missing in the result.
pub fn trend(earlier: &ForecastGrid, later: &ForecastGrid) -> FireWxResult<ForecastGrid> {
    check_shape(later.shape(), earlier.shape())?;

    let mut out = later.clone();
    out.name = format!("{} Trend", later.name);
    for (v, &e) in out.values.iter_mut().zip(&earlier.values) {
        *v -= e;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use firewx_common::ValidWindow;
    use ndfd_parser::LatLonGrid;

    fn grid(width: usize, height: usize, values: Vec<f32>) -> ForecastGrid {
        let t = Utc.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap();
        ForecastGrid {
            name: "MinRH".to_string(),
            units: "%".to_string(),
            reference_time: t,
            window: ValidWindow::instant(t),
            statistical_process: None,
            width,
            height,
            values,
            geometry: GridGeometry::LatLon(LatLonGrid {
                south: 30.0,
                west: -120.0,
                dlat: 1.0,
                dlon: 1.0,
                nx: width,
                ny: height,
            }),
        }
    }

    #[test]
    fn test_comparison_inclusive() {
        assert!(Comparison::AtOrBelow.holds(15.0, 15.0));
        assert!(Comparison::AtOrAbove.holds(20.0, 20.0));
        assert!(!Comparison::AtOrBelow.holds(15.1, 15.0));
        assert!(!Comparison::AtOrAbove.holds(f32::NAN, 0.0));
    }

    #[test]
    fn test_threshold_mask_nan_false() {
        let g = grid(2, 2, vec![10.0, f32::NAN, 15.0, 16.0]);
        let mask = threshold_mask(&g, Comparison::AtOrBelow, 15.0);
        assert_eq!(mask.values, vec![true, false, true, false]);
        assert_eq!(mask.shape(), g.shape());
    }

    #[test]
    fn test_value_at() {
        let g = grid(2, 2, vec![10.0, 50.0, 50.0, 50.0]);
        let mask = threshold_mask(&g, Comparison::AtOrBelow, 15.0);
        assert_eq!(mask.value_at(30.0, -120.0), Some(true));
        assert_eq!(mask.value_at(31.0, -119.0), Some(false));
        assert_eq!(mask.value_at(45.0, -100.0), None);
    }

    #[test]
    fn test_trend_shape_mismatch() {
        let a = grid(2, 2, vec![0.0; 4]);
        let b = grid(3, 2, vec![0.0; 6]);
        assert!(matches!(
            trend(&a, &b),
            Err(FireWxError::ShapeMismatch {
                expected: (2, 3),
                actual: (2, 2)
            })
        ));
    }
}
