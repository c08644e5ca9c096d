//! Sparse station samples for value labels.

use firewx_common::BoundingBox;

use crate::grid::ForecastGrid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    pub lat: f64,
    pub lon: f64,
    pub value: f32,
}

impl Station {
    /// Label text: the value rounded to a whole number.
    pub fn label(&self) -> String {
        format!("{}", self.value.round() as i64)
    }
}

/// Grid values thinned to every `decimate`-th point in both directions.
#[derive(Debug, Clone, Default)]
pub struct StationTable {
    stations: Vec<Station>,
}

impl StationTable {
    /// Sample a grid inside an extent, skipping missing values.
    ///
    /// Sampling always starts at grid index 0 so successive frames label
    /// the same points.
    pub fn sample(grid: &ForecastGrid, extent: &BoundingBox, decimate: usize) -> Self {
        let step = decimate.max(1);
        let mut stations = Vec::new();

        for j in (0..grid.height).step_by(step) {
            for i in (0..grid.width).step_by(step) {
                let value = match grid.get(i, j) {
                    Some(v) if !v.is_nan() => v,
                    _ => continue,
                };
                let (lat, lon) = grid.lat_lon(i, j);
                if extent.contains_point(lat, lon) {
                    stations.push(Station { lat, lon, value });
                }
            }
        }

        Self { stations }
    }

    pub fn from_stations(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_rounds() {
        let s = Station { lat: 0.0, lon: 0.0, value: 14.6 };
        assert_eq!(s.label(), "15");
        let s = Station { lat: 0.0, lon: 0.0, value: -3.4 };
        assert_eq!(s.label(), "-3");
    }
}
