//! Grid geometry and scan-order normalization.
//!
//! Every [`ForecastGrid`](crate::ForecastGrid) is stored row-major with
//! row 0 at the southern edge and columns increasing eastward, whatever
//! scanning mode the file used.

use firewx_common::BoundingBox;
use projection::LambertConformal;

use crate::error::{NdfdError, NdfdResult};
use crate::sections::{GridDefinition, GridTemplate};

// Scanning mode flags (Flag Table 3.4)
const SCAN_I_NEGATIVE: u8 = 0x80;
const SCAN_J_POSITIVE: u8 = 0x40;
const SCAN_J_CONSECUTIVE: u8 = 0x20;
const SCAN_BOUSTROPHEDON: u8 = 0x10;

/// A regular latitude/longitude grid anchored at its south-west point.
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGrid {
    pub south: f64,
    /// Western edge in -180..180
    pub west: f64,
    pub dlat: f64,
    pub dlon: f64,
    pub nx: usize,
    pub ny: usize,
}

impl LatLonGrid {
    fn lat_lon(&self, i: usize, j: usize) -> (f64, f64) {
        let lat = self.south + j as f64 * self.dlat;
        let lon = wrap_lon(self.west + i as f64 * self.dlon);
        (lat, lon)
    }

    fn fractional_index(&self, lat: f64, lon: f64) -> (f64, f64) {
        let di = (lon - self.west).rem_euclid(360.0) / self.dlon;
        let dj = (lat - self.south) / self.dlat;
        (di, dj)
    }
}

/// Geographic placement of a normalized grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridGeometry {
    LatLon(LatLonGrid),
    Lambert(LambertConformal),
}

impl GridGeometry {
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            GridGeometry::LatLon(g) => (g.nx, g.ny),
            GridGeometry::Lambert(p) => (p.nx, p.ny),
        }
    }

    /// Latitude and longitude of grid point (i, j).
    pub fn lat_lon(&self, i: usize, j: usize) -> (f64, f64) {
        match self {
            GridGeometry::LatLon(g) => g.lat_lon(i, j),
            GridGeometry::Lambert(p) => p.grid_to_geo(i as f64, j as f64),
        }
    }

    /// Nearest grid point to a location, or None when it falls off the grid.
    pub fn grid_index(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        let (fi, fj) = match self {
            GridGeometry::LatLon(g) => g.fractional_index(lat, lon),
            GridGeometry::Lambert(p) => p.geo_to_grid(lat, lon),
        };
        let (nx, ny) = self.dimensions();
        let (i, j) = (fi.round(), fj.round());
        if i < 0.0 || j < 0.0 || i >= nx as f64 || j >= ny as f64 {
            return None;
        }
        Some((i as usize, j as usize))
    }

    /// Geographic extent enclosing every grid point.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            GridGeometry::LatLon(g) => {
                let east = g.west + (g.nx.saturating_sub(1)) as f64 * g.dlon;
                let north = g.south + (g.ny.saturating_sub(1)) as f64 * g.dlat;
                BoundingBox::new(g.west, g.south, east.min(180.0), north)
            }
            GridGeometry::Lambert(p) => {
                let (w, s, e, n) = p.geographic_bounds();
                BoundingBox::new(w, s, e, n)
            }
        }
    }
}

/// Build the normalized geometry for a grid definition and reorder the
/// values (given in file scan order) to south-to-north, west-to-east rows.
pub fn normalize(grid: &GridDefinition, values: Vec<f32>) -> NdfdResult<(GridGeometry, Vec<f32>)> {
    let nx = grid.ni as usize;
    let ny = grid.nj as usize;
    if nx == 0 || ny == 0 || nx * ny != values.len() {
        return Err(NdfdError::InvalidSection {
            section: 3,
            reason: format!("{}x{} grid does not match {} values", nx, ny, values.len()),
        });
    }

    let scan = grid.scanning_mode;
    let i_negative = scan & SCAN_I_NEGATIVE != 0;
    let j_positive = scan & SCAN_J_POSITIVE != 0;

    let values = reorder(values, nx, ny, scan);

    let geometry = match grid.template {
        GridTemplate::LatLon {
            la1,
            lo1,
            la2,
            lo2,
            di,
            dj,
        } => GridGeometry::LatLon(LatLonGrid {
            south: la1.min(la2),
            west: wrap_lon(if i_negative { lo2 } else { lo1 }),
            dlat: dj,
            dlon: di,
            nx,
            ny,
        }),
        GridTemplate::Lambert {
            la1,
            lo1,
            lov,
            dx,
            dy,
            latin1,
            latin2,
            ..
        } => {
            let proj = LambertConformal::with_earth_radius(
                la1,
                lo1,
                lov,
                latin1,
                latin2,
                dx,
                dy,
                nx,
                ny,
                grid.earth_radius,
            );
            let shift_i = if i_negative { -((nx - 1) as f64) } else { 0.0 };
            let shift_j = if j_positive { 0.0 } else { -((ny - 1) as f64) };
            if shift_i != 0.0 || shift_j != 0.0 {
                GridGeometry::Lambert(proj.reanchored(shift_i, shift_j))
            } else {
                GridGeometry::Lambert(proj)
            }
        }
    };

    Ok((geometry, values))
}

/// Reorder file-order values into south-first, west-first rows.
fn reorder(values: Vec<f32>, nx: usize, ny: usize, scan: u8) -> Vec<f32> {
    // Bring column-major data into row-major order in file directions
    let mut rows: Vec<f32> = if scan & SCAN_J_CONSECUTIVE != 0 {
        let mut out = vec![f32::NAN; nx * ny];
        for i in 0..nx {
            for j in 0..ny {
                out[j * nx + i] = values[i * ny + j];
            }
        }
        out
    } else {
        values
    };

    if scan & SCAN_BOUSTROPHEDON != 0 {
        for j in (1..ny).step_by(2) {
            rows[j * nx..(j + 1) * nx].reverse();
        }
    }

    if scan & SCAN_I_NEGATIVE != 0 {
        for row in rows.chunks_mut(nx) {
            row.reverse();
        }
    }

    if scan & SCAN_J_POSITIVE == 0 {
        let mut flipped = Vec::with_capacity(rows.len());
        for row in rows.chunks(nx).rev() {
            flipped.extend_from_slice(row);
        }
        rows = flipped;
    }

    rows
}

fn wrap_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_north_to_south() {
        // 2x2 grid scanned north row first
        let values = vec![3.0, 4.0, 1.0, 2.0];
        assert_eq!(reorder(values, 2, 2, 0x00), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_reorder_column_major() {
        // j consecutive, +j: columns stored south to north
        let values = vec![1.0, 3.0, 2.0, 4.0];
        assert_eq!(
            reorder(values, 2, 2, SCAN_J_POSITIVE | SCAN_J_CONSECUTIVE),
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_reorder_west_ward() {
        let values = vec![2.0, 1.0, 4.0, 3.0];
        assert_eq!(
            reorder(values, 2, 2, SCAN_J_POSITIVE | SCAN_I_NEGATIVE),
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_wrap_lon() {
        assert_eq!(wrap_lon(238.0), -122.0);
        assert_eq!(wrap_lon(-122.0), -122.0);
        assert_eq!(wrap_lon(180.0), 180.0);
    }
}
