//! Forecast grids: one variable over one validity window.

use chrono::{DateTime, Utc};
use firewx_common::{UnitConversion, ValidWindow};

use crate::error::NdfdResult;
use crate::geometry::{normalize, GridGeometry};
use crate::message::RawField;
use crate::sections::StatisticalProcess;
use crate::tables::{field_name, field_units};

/// A decoded 2-D field.
///
/// Values are row-major with `height` rows of `width` columns; row 0 is the
/// southern edge. Missing points are NaN.
#[derive(Debug, Clone)]
pub struct ForecastGrid {
    pub name: String,
    pub units: String,
    pub reference_time: DateTime<Utc>,
    pub window: ValidWindow,
    pub statistical_process: Option<StatisticalProcess>,
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
    pub geometry: GridGeometry,
}

impl ForecastGrid {
    /// Decode and normalize a parsed field.
    pub fn from_raw(field: &RawField<'_>) -> NdfdResult<Self> {
        let name = field_name(
            field.discipline,
            field.product.parameter_category,
            field.product.parameter_number,
            field.product.statistical_process,
        );

        let reference_time = field.identification.reference_time;
        let start = reference_time + field.product.forecast_offset()?;
        let window = match field.product.end_of_interval {
            Some(end) => ValidWindow::new(start, end),
            None => ValidWindow::instant(start),
        };

        let values = field.decode_values()?;
        let (geometry, values) = normalize(&field.grid, values)?;
        let (width, height) = geometry.dimensions();

        Ok(Self {
            name: name.to_string(),
            units: field_units(name).to_string(),
            reference_time,
            window,
            statistical_process: field.product.statistical_process,
            width,
            height,
            values,
            geometry,
        })
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.width || j >= self.height {
            return None;
        }
        self.values.get(j * self.width + i).copied()
    }

    /// Nearest-neighbour value at a location; NaN off the grid.
    pub fn value_at(&self, lat: f64, lon: f64) -> f32 {
        self.geometry
            .grid_index(lat, lon)
            .and_then(|(i, j)| self.get(i, j))
            .unwrap_or(f32::NAN)
    }

    pub fn lat_lon(&self, i: usize, j: usize) -> (f64, f64) {
        self.geometry.lat_lon(i, j)
    }

    /// Minimum and maximum of the non-missing values.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Copy of this grid with a unit conversion applied.
    pub fn converted(&self, conversion: UnitConversion) -> Self {
        let mut out = self.clone();
        conversion.apply_in_place(&mut out.values);
        out.units = conversion.output_units(&self.units).to_string();
        out
    }

    /// Same layout and placement as another grid.
    pub fn is_aligned_with(&self, other: &ForecastGrid) -> bool {
        self.shape() == other.shape() && self.geometry == other.geometry
    }
}
