//! Display-space rasters resampled from geographic grids.

use projection::MapView;

/// Anything that can answer "what is the value at this point".
///
/// Returns NaN outside the source's coverage or where data is missing.
pub trait GridSource {
    fn value_at(&self, lat: f64, lon: f64) -> f32;
}

impl<F> GridSource for F
where
    F: Fn(f64, f64) -> f32,
{
    fn value_at(&self, lat: f64, lon: f64) -> f32 {
        self(lat, lon)
    }
}

/// Row-major `f32` raster, row 0 at the top of the map panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
}

impl Raster {
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), (width * height) as usize);
        Self {
            width,
            height,
            values,
        }
    }

    /// Nearest-neighbour sample of `source` at every pixel centre of `view`.
    pub fn sample<S: GridSource + ?Sized>(source: &S, view: &MapView) -> Self {
        let mut values = Vec::with_capacity((view.width * view.height) as usize);
        for y in 0..view.height {
            for x in 0..view.width {
                let (lat, lon) = view.pixel_to_geo(x, y);
                values.push(source.value_at(lat, lon));
            }
        }
        Self::new(view.width, view.height, values)
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return f32::NAN;
        }
        self.values[(y * self.width + x) as usize]
    }

    /// Count of non-NaN pixels.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Min and max over non-NaN pixels.
    pub fn range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Pixels where `keep` holds; NaN pixels never pass.
    pub fn to_mask(&self, keep: impl Fn(f32) -> bool) -> BoolRaster {
        BoolRaster {
            width: self.width,
            height: self.height,
            values: self.values.iter().map(|&v| !v.is_nan() && keep(v)).collect(),
        }
    }
}

/// Boolean raster in the same layout as [`Raster`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoolRaster {
    pub width: u32,
    pub height: u32,
    pub values: Vec<bool>,
}

impl BoolRaster {
    /// Sample a boolean source (e.g. a threshold mask looked up by lat/lon).
    pub fn sample(source: impl Fn(f64, f64) -> Option<bool>, view: &MapView) -> Self {
        let mut values = Vec::with_capacity((view.width * view.height) as usize);
        for y in 0..view.height {
            for x in 0..view.width {
                let (lat, lon) = view.pixel_to_geo(x, y);
                values.push(source(lat, lon).unwrap_or(false));
            }
        }
        Self {
            width: view.width,
            height: view.height,
            values,
        }
    }

    pub fn count(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firewx_common::BoundingBox;

    #[test]
    fn test_sample_closure_source() {
        let view = MapView::new(BoundingBox::new(-120.0, 30.0, -110.0, 40.0), 10, 10);
        let raster = Raster::sample(&|_lat: f64, lon: f64| lon as f32, &view);
        assert_eq!(raster.values.len(), 100);
        assert!((raster.get(0, 0) - -119.5).abs() < 1e-4);
        assert!((raster.get(9, 5) - -110.5).abs() < 1e-4);
        assert!(raster.get(10, 0).is_nan());
    }

    #[test]
    fn test_range_skips_nan() {
        let raster = Raster::new(2, 2, vec![f32::NAN, 3.0, -1.0, 7.0]);
        assert_eq!(raster.range(), Some((-1.0, 7.0)));
        assert_eq!(raster.valid_count(), 3);
    }

    #[test]
    fn test_to_mask() {
        let raster = Raster::new(2, 2, vec![f32::NAN, 10.0, 20.0, 5.0]);
        let mask = raster.to_mask(|v| v <= 10.0);
        assert_eq!(mask.values, vec![false, true, false, true]);
        assert_eq!(mask.count(), 2);
    }
}
