//! Equirectangular display projection for map panels.
//!
//! A `MapView` maps a geographic extent onto a pixel rectangle. Pixel (0, 0)
//! is the north-west corner; x grows eastward and y southward.

use firewx_common::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub extent: BoundingBox,
    pub width: u32,
    pub height: u32,
}

impl MapView {
    pub fn new(extent: BoundingBox, width: u32, height: u32) -> Self {
        Self {
            extent,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// View of `width` pixels whose height keeps ground distances square at
    /// the center latitude.
    pub fn fit_width(extent: BoundingBox, width: u32) -> Self {
        let height = aspect_height(&extent, width);
        Self::new(extent, width, height)
    }

    /// Degrees of longitude per pixel.
    pub fn lon_per_pixel(&self) -> f64 {
        self.extent.width() / self.width as f64
    }

    /// Degrees of latitude per pixel.
    pub fn lat_per_pixel(&self) -> f64 {
        self.extent.height() / self.height as f64
    }

    /// Geographic point to fractional pixel coordinates.
    pub fn geo_to_pixel(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = (lon - self.extent.west) / self.lon_per_pixel();
        let y = (self.extent.north - lat) / self.lat_per_pixel();
        (x, y)
    }

    /// Geographic point at the center of pixel (x, y), as (lat, lon).
    pub fn pixel_to_geo(&self, x: u32, y: u32) -> (f64, f64) {
        self.fractional_pixel_to_geo(x as f64 + 0.5, y as f64 + 0.5)
    }

    pub fn fractional_pixel_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = self.extent.west + x * self.lon_per_pixel();
        let lat = self.extent.north - y * self.lat_per_pixel();
        (lat, lon)
    }

    /// Whether a pixel coordinate lands inside the view.
    pub fn contains_pixel(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width as f64 && y < self.height as f64
    }
}

/// Pixel height matching `width` for the extent, clamped to a sane aspect.
pub fn aspect_height(extent: &BoundingBox, width: u32) -> u32 {
    let (lat_c, _) = extent.center();
    let x_span = extent.width() * lat_c.to_radians().cos().max(0.2);
    let ratio = (extent.height() / x_span).clamp(0.25, 4.0);
    ((width as f64) * ratio).round().max(1.0) as u32
}
