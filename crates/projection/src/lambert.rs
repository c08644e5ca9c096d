//! Lambert Conformal Conic projection.
//!
//! NDFD CONUS grids are defined on a Lambert Conformal cone tangent at 25°N.
//! The projection maps grid indices (i, j) to geographic coordinates and
//! back, with (0, 0) at the first grid point.
//!
//! The projection parameters include:
//! - Central meridian (LoV in GRIB2)
//! - Standard parallel(s): Latin1 and Latin2 (equal for a tangent cone)
//! - Grid spacing: dx, dy in meters
//! - First grid point: lat1, lon1

use std::f64::consts::PI;

/// Radius of the spherical earth used by NDFD (GRIB2 shape of earth 1).
pub const NDFD_EARTH_RADIUS: f64 = 6_371_200.0;

/// Radius for GRIB2 shape of earth 6.
pub const GRIB2_EARTH_RADIUS: f64 = 6_371_229.0;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LambertConformal {
    /// Central meridian (LoV) in radians
    pub lon0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Latitude of first grid point in radians
    pub lat1: f64,
    /// Longitude of first grid point in radians
    pub lon1: f64,
    /// Grid spacing in X direction (meters)
    pub dx: f64,
    /// Grid spacing in Y direction (meters)
    pub dy: f64,
    pub nx: usize,
    pub ny: usize,
    pub earth_radius: f64,
    /// Cone constant
    n: f64,
    f: f64,
    /// Rho at the first grid point
    rho0: f64,
    /// First grid point in projection meters
    x0: f64,
    y0: f64,
}

impl LambertConformal {
    /// Create a projection from GRIB2 template 3.30 parameters (degrees, meters).
    #[allow(clippy::too_many_arguments)]
    pub fn from_grib2(
        lat1_deg: f64,
        lon1_deg: f64,
        lov_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
    ) -> Self {
        Self::with_earth_radius(
            lat1_deg,
            lon1_deg,
            lov_deg,
            latin1_deg,
            latin2_deg,
            dx,
            dy,
            nx,
            ny,
            GRIB2_EARTH_RADIUS,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_earth_radius(
        lat1_deg: f64,
        lon1_deg: f64,
        lov_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        dx: f64,
        dy: f64,
        nx: usize,
        ny: usize,
        earth_radius: f64,
    ) -> Self {
        let lat1 = lat1_deg.to_radians();
        let lon1 = lon1_deg.to_radians();
        let lon0 = lov_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();

        let n = if (latin1 - latin2).abs() < 1e-10 {
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat1 / 2.0).tan().powf(n);

        let theta0 = n * normalize_angle(lon1 - lon0);
        let x0 = rho0 * theta0.sin();
        let y0 = rho0 - rho0 * theta0.cos();

        Self {
            lon0,
            latin1,
            latin2,
            lat1,
            lon1,
            dx,
            dy,
            nx,
            ny,
            earth_radius,
            n,
            f,
            rho0,
            x0,
            y0,
        }
    }

    /// The NDFD 2.5 km CONUS grid.
    ///
    /// - First point: 20.192°N, 238.446°E
    /// - LoV: 265°E, standard parallel 25°N
    /// - Grid: 2145 x 1377, 2539.703 m spacing
    pub fn ndfd_conus() -> Self {
        Self::with_earth_radius(
            20.191999,
            238.445999,
            265.0,
            25.0,
            25.0,
            2539.703,
            2539.703,
            2145,
            1377,
            NDFD_EARTH_RADIUS,
        )
    }

    /// Same grid with its first point moved to grid position (i, j).
    ///
    /// Used to re-anchor a grid at its south-west corner after flipping
    /// the scan direction of rows or columns.
    pub fn reanchored(&self, i: f64, j: f64) -> Self {
        let (lat, lon) = self.grid_to_geo(i, j);
        Self::with_earth_radius(
            lat,
            lon,
            self.lon0.to_degrees(),
            self.latin1.to_degrees(),
            self.latin2.to_degrees(),
            self.dx,
            self.dy,
            self.nx,
            self.ny,
            self.earth_radius,
        )
    }

    /// Convert geographic coordinates (degrees) to fractional grid indices (i, j).
    pub fn geo_to_grid(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let dlon = normalize_angle(lon_deg.to_radians() - self.lon0);

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();

        ((x - self.x0) / self.dx, (y - self.y0) / self.dy)
    }

    /// Convert grid indices (i, j) to geographic coordinates, returned as (lat, lon)
    /// with longitude in -180..180.
    pub fn grid_to_geo(&self, i: f64, j: f64) -> (f64, f64) {
        let x = self.x0 + i * self.dx;
        let y = self.y0 + j * self.dy;

        let rho = (x * x + (self.rho0 - y) * (self.rho0 - y)).sqrt();
        let rho = if self.n < 0.0 { -rho } else { rho };
        let theta = (x / (self.rho0 - y)).atan();

        let lat = 2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0;
        let lon = normalize_angle(self.lon0 + theta / self.n);

        (lat.to_degrees(), lon.to_degrees())
    }

    /// Approximate geographic bounds enclosing all grid points.
    ///
    /// Returns (min_lon, min_lat, max_lon, max_lat). The grid edges are
    /// curved in geographic space, so the edges are sampled.
    pub fn geographic_bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lon = f64::MAX;
        let mut max_lon = f64::MIN;

        let last_i = self.nx.saturating_sub(1) as f64;
        let last_j = self.ny.saturating_sub(1) as f64;

        for t in 0..=20 {
            let frac = t as f64 / 20.0;
            for (i, j) in [
                (frac * last_i, 0.0),
                (frac * last_i, last_j),
                (0.0, frac * last_j),
                (last_i, frac * last_j),
            ] {
                let (lat, lon) = self.grid_to_geo(i, j);
                min_lat = min_lat.min(lat);
                max_lat = max_lat.max(lat);
                min_lon = min_lon.min(lon);
                max_lon = max_lon.max(lon);
            }
        }

        (min_lon, min_lat, max_lon, max_lat)
    }

    /// Check if a geographic point falls on the grid.
    pub fn contains(&self, lat_deg: f64, lon_deg: f64) -> bool {
        let (i, j) = self.geo_to_grid(lat_deg, lon_deg);
        i >= -0.5 && i < self.nx as f64 - 0.5 && j >= -0.5 && j < self.ny as f64 - 0.5
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

/// Wrap an angle in radians to [-π, π].
fn normalize_angle(mut a: f64) -> f64 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}
