//! Synthetic NDFD GRIB2 messages.
//!
//! Builds minimal but structurally valid GRIB2 messages the way NDFD
//! publishes them: one field per message, lat/lon (3.0) or Lambert
//! conformal (3.30) grids, instantaneous (4.0) or statistically processed
//! (4.8) products, and simple packing with an optional bitmap.
//!
//! Data is supplied south row first, west to east; `build` rewrites it into
//! the configured scanning order.

use chrono::{Datelike, Duration, NaiveDate, Timelike};

/// Grid template written to Section 3.
#[derive(Debug, Clone, Copy)]
pub enum BuilderGrid {
    /// Regular lat/lon grid anchored at its south-west point (degrees).
    LatLon {
        south: f64,
        west: f64,
        dlat: f64,
        dlon: f64,
    },
    /// Lambert conformal grid with its first point at the south-west corner.
    Lambert {
        la1: f64,
        lo1: f64,
        lov: f64,
        latin: f64,
        /// Grid spacing in meters
        dx: f64,
    },
}

/// Build a GRIB2 message shaped like an NDFD `.bin` entry.
#[derive(Debug, Clone)]
pub struct NdfdMessageBuilder {
    center: u16,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    ni: u32,
    nj: u32,
    grid: BuilderGrid,
    scanning_mode: u8,
    param_category: u8,
    param_number: u8,
    forecast_hour: u32,
    /// (statistical process, period length in hours) for template 4.8
    statistic: Option<(u8, u32)>,
    decimal_scale: i16,
    data_values: Vec<f32>,
}

impl NdfdMessageBuilder {
    /// 10x8 one-degree lat/lon grid over California with hourly RH.
    pub fn new() -> Self {
        let ni = 10;
        let nj = 8;
        Self {
            center: 8, // US NWS Telecommunications Gateway
            year: 2024,
            month: 7,
            day: 4,
            hour: 12,
            ni,
            nj,
            grid: BuilderGrid::LatLon {
                south: 33.0,
                west: -123.0,
                dlat: 1.0,
                dlon: 1.0,
            },
            scanning_mode: 0b0100_0000, // +i, +j, i consecutive
            param_category: 1,
            param_number: 1,
            forecast_hour: 0,
            statistic: None,
            decimal_scale: 0,
            data_values: vec![50.0; (ni * nj) as usize],
        }
    }

    /// Hourly relative humidity (%).
    pub fn rh() -> Self {
        Self::new()
    }

    /// Daytime minimum relative humidity (%), 12-hour period.
    pub fn min_rh() -> Self {
        Self::new().with_parameter(1, 1).with_statistic(3, 12)
    }

    /// Overnight maximum relative humidity (%), 12-hour period.
    pub fn max_rh() -> Self {
        Self::new()
            .with_parameter(1, 1)
            .with_statistic(2, 12)
            .with_forecast_hour(12)
    }

    /// Daytime maximum temperature (K).
    pub fn max_t() -> Self {
        Self::new()
            .with_parameter(0, 4)
            .with_statistic(2, 12)
            .with_constant_value(300.0)
    }

    /// Overnight minimum temperature (K).
    pub fn min_t() -> Self {
        Self::new()
            .with_parameter(0, 5)
            .with_statistic(3, 12)
            .with_forecast_hour(12)
            .with_constant_value(285.0)
    }

    /// Sustained wind speed (m/s).
    pub fn wind_speed() -> Self {
        Self::new().with_parameter(2, 1).with_constant_value(5.0)
    }

    /// Wind gust (m/s).
    pub fn wind_gust() -> Self {
        Self::new().with_parameter(2, 22).with_constant_value(8.0)
    }

    /// Small Lambert grid at the south-west corner of the NDFD CONUS domain.
    pub fn lambert(ni: u32, nj: u32) -> Self {
        Self::new()
            .with_grid(ni, nj)
            .with_grid_template(BuilderGrid::Lambert {
                la1: 20.191999,
                lo1: 238.445999,
                lov: 265.0,
                latin: 25.0,
                dx: 2539.703,
            })
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self
    }

    pub fn with_grid(mut self, ni: u32, nj: u32) -> Self {
        self.ni = ni;
        self.nj = nj;
        self.data_values = vec![0.0; (ni * nj) as usize];
        self
    }

    pub fn with_grid_template(mut self, grid: BuilderGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Move a lat/lon grid's south-west point.
    pub fn with_origin(mut self, south: f64, west: f64) -> Self {
        if let BuilderGrid::LatLon { dlat, dlon, .. } = self.grid {
            self.grid = BuilderGrid::LatLon {
                south,
                west,
                dlat,
                dlon,
            };
        }
        self
    }

    pub fn with_scanning_mode(mut self, mode: u8) -> Self {
        self.scanning_mode = mode;
        self
    }

    pub fn with_parameter(mut self, category: u8, number: u8) -> Self {
        self.param_category = category;
        self.param_number = number;
        self
    }

    pub fn with_forecast_hour(mut self, hour: u32) -> Self {
        self.forecast_hour = hour;
        self
    }

    /// Use template 4.8 with a statistical process over `hours`.
    pub fn with_statistic(mut self, process: u8, hours: u32) -> Self {
        self.statistic = Some((process, hours));
        self
    }

    pub fn with_decimal_scale(mut self, d: i16) -> Self {
        self.decimal_scale = d;
        self
    }

    pub fn with_constant_value(mut self, value: f32) -> Self {
        self.data_values = vec![value; (self.ni * self.nj) as usize];
        self
    }

    /// Values increasing west to east from `min_val` to `max_val`.
    pub fn with_gradient(mut self, min_val: f32, max_val: f32) -> Self {
        let ni = self.ni as usize;
        let n = (self.ni * self.nj) as usize;
        let span = (ni.max(2) - 1) as f32;
        self.data_values = (0..n)
            .map(|k| min_val + (max_val - min_val) * ((k % ni) as f32 / span))
            .collect();
        self
    }

    /// Values in south-first row-major order; NaN marks missing points.
    pub fn with_data(mut self, data: Vec<f32>) -> Self {
        self.data_values = data;
        self
    }

    /// Build the complete GRIB2 message bytes
    pub fn build(&self) -> Vec<u8> {
        let values = self.scan_order_values();

        let section1 = self.build_section1();
        let section3 = self.build_section3();
        let section4 = self.build_section4();
        let section5 = self.build_section5(&values);
        let section6 = self.build_section6(&values);
        let section7 = self.build_section7(&values);

        let message_length = 16
            + section1.len()
            + section3.len()
            + section4.len()
            + section5.len()
            + section6.len()
            + section7.len()
            + 4;

        let mut message = Vec::with_capacity(message_length);

        // Section 0: Indicator
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]);
        message.push(0); // Meteorological products
        message.push(2);
        message.extend_from_slice(&(message_length as u64).to_be_bytes());

        message.extend_from_slice(&section1);
        message.extend_from_slice(&section3);
        message.extend_from_slice(&section4);
        message.extend_from_slice(&section5);
        message.extend_from_slice(&section6);
        message.extend_from_slice(&section7);

        // Section 8: End
        message.extend_from_slice(b"7777");

        message
    }

    fn scan_order_values(&self) -> Vec<f32> {
        let ni = self.ni as usize;
        let nj = self.nj as usize;
        let i_negative = self.scanning_mode & 0x80 != 0;
        let j_positive = self.scanning_mode & 0x40 != 0;
        let j_consecutive = self.scanning_mode & 0x20 != 0;

        let at = |i_file: usize, j_file: usize| {
            let col = if i_negative { ni - 1 - i_file } else { i_file };
            let row = if j_positive { j_file } else { nj - 1 - j_file };
            self.data_values[row * ni + col]
        };

        let mut out = Vec::with_capacity(ni * nj);
        if j_consecutive {
            for i in 0..ni {
                for j in 0..nj {
                    out.push(at(i, j));
                }
            }
        } else {
            for j in 0..nj {
                for i in 0..ni {
                    out.push(at(i, j));
                }
            }
        }
        out
    }

    fn build_section1(&self) -> Vec<u8> {
        let mut section = Vec::new();
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(1);

        section.extend_from_slice(&self.center.to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // Sub-center
        section.push(2); // Master table version
        section.push(1); // Local table version
        section.push(1); // Start of forecast

        section.extend_from_slice(&self.year.to_be_bytes());
        section.push(self.month);
        section.push(self.day);
        section.push(self.hour);
        section.push(0);
        section.push(0);

        section.push(0); // Operational products
        section.push(1); // Forecast products

        section
    }

    fn build_section3(&self) -> Vec<u8> {
        let mut section = Vec::new();
        let (template, template_len): (u16, u32) = match self.grid {
            BuilderGrid::LatLon { .. } => (0, 58),
            BuilderGrid::Lambert { .. } => (30, 67),
        };

        section.extend_from_slice(&(14 + template_len).to_be_bytes());
        section.push(3);
        section.push(0); // Source of grid definition
        section.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        section.push(0);
        section.push(0);
        section.extend_from_slice(&template.to_be_bytes());

        // Shape of the earth: sphere with radius 6 371 200 m
        section.push(1);
        section.push(0);
        section.extend_from_slice(&6_371_200u32.to_be_bytes());
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());

        section.extend_from_slice(&self.ni.to_be_bytes());
        section.extend_from_slice(&self.nj.to_be_bytes());

        match self.grid {
            BuilderGrid::LatLon {
                south,
                west,
                dlat,
                dlon,
            } => {
                let north = south + (self.nj - 1) as f64 * dlat;
                let east = west + (self.ni - 1) as f64 * dlon;
                let (la1, la2) = if self.scanning_mode & 0x40 != 0 {
                    (south, north)
                } else {
                    (north, south)
                };
                let (lo1, lo2) = if self.scanning_mode & 0x80 != 0 {
                    (east, west)
                } else {
                    (west, east)
                };

                section.extend_from_slice(&0u32.to_be_bytes()); // Basic angle
                section.extend_from_slice(&0xFFFF_FFFFu32.to_be_bytes()); // Subdivisions
                section.extend_from_slice(&encode_signed(micro(la1)));
                section.extend_from_slice(&encode_signed(micro(east_positive(lo1))));
                section.push(48); // Resolution and component flags
                section.extend_from_slice(&encode_signed(micro(la2)));
                section.extend_from_slice(&encode_signed(micro(east_positive(lo2))));
                section.extend_from_slice(&(micro(dlon) as u32).to_be_bytes());
                section.extend_from_slice(&(micro(dlat) as u32).to_be_bytes());
                section.push(self.scanning_mode);
            }
            BuilderGrid::Lambert {
                la1,
                lo1,
                lov,
                latin,
                dx,
            } => {
                let dx_mm = (dx * 1000.0).round() as u32;
                section.extend_from_slice(&encode_signed(micro(la1)));
                section.extend_from_slice(&(micro(east_positive(lo1)) as u32).to_be_bytes());
                section.push(0); // Resolution and component flags
                section.extend_from_slice(&encode_signed(micro(latin))); // LaD
                section.extend_from_slice(&(micro(east_positive(lov)) as u32).to_be_bytes());
                section.extend_from_slice(&dx_mm.to_be_bytes());
                section.extend_from_slice(&dx_mm.to_be_bytes());
                section.push(0); // Projection centre flag
                section.push(self.scanning_mode);
                section.extend_from_slice(&encode_signed(micro(latin)));
                section.extend_from_slice(&encode_signed(micro(latin)));
                section.extend_from_slice(&encode_signed(micro(-90.0))); // Southern pole
                section.extend_from_slice(&0u32.to_be_bytes());
            }
        }

        section
    }

    fn build_section4(&self) -> Vec<u8> {
        let mut section = Vec::new();
        let (template, length): (u16, u32) = match self.statistic {
            Some(_) => (8, 58),
            None => (0, 34),
        };

        section.extend_from_slice(&length.to_be_bytes());
        section.push(4);
        section.extend_from_slice(&0u16.to_be_bytes()); // Coordinate values
        section.extend_from_slice(&template.to_be_bytes());

        section.push(self.param_category);
        section.push(self.param_number);
        section.push(2); // Forecast
        section.push(0);
        section.push(0);
        section.extend_from_slice(&0u16.to_be_bytes());
        section.push(0);
        section.push(1); // Hours
        section.extend_from_slice(&self.forecast_hour.to_be_bytes());

        section.push(103); // Height above ground
        section.push(0);
        section.extend_from_slice(&2u32.to_be_bytes());
        section.push(255);
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());

        if let Some((process, hours)) = self.statistic {
            let end = NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)
                .and_then(|d| d.and_hms_opt(self.hour as u32, 0, 0))
                .map(|t| t + Duration::hours((self.forecast_hour + hours) as i64))
                .unwrap_or_default();

            section.extend_from_slice(&(end.year() as u16).to_be_bytes());
            section.push(end.month() as u8);
            section.push(end.day() as u8);
            section.push(end.hour() as u8);
            section.push(end.minute() as u8);
            section.push(end.second() as u8);
            section.push(1); // Number of time ranges
            section.extend_from_slice(&0u32.to_be_bytes()); // Missing values
            section.push(process);
            section.push(2); // Successive times, same reference
            section.push(1); // Hours
            section.extend_from_slice(&hours.to_be_bytes());
            section.push(255);
            section.extend_from_slice(&0u32.to_be_bytes());
        }

        section
    }

    /// (reference value, binary scale, bits per value) for the present values.
    fn packing(&self, values: &[f32]) -> (f32, i16, u8) {
        let scale = 10f64.powi(self.decimal_scale as i32);
        let (min_val, max_val) = values
            .iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                let s = v as f64 * scale;
                (lo.min(s), hi.max(s))
            });

        if !min_val.is_finite() {
            return (0.0, 0, 0);
        }

        let reference = min_val as f32;
        let range = max_val - reference as f64;
        if range <= 0.0 {
            return (reference, 0, 0);
        }
        let binary_scale = (range / 65535.0).log2().ceil() as i16;
        (reference, binary_scale, 16)
    }

    fn build_section5(&self, values: &[f32]) -> Vec<u8> {
        let (reference, binary_scale, bits) = self.packing(values);

        let mut section = Vec::new();
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(5);
        section.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // Template 5.0

        section.extend_from_slice(&reference.to_be_bytes());
        section.extend_from_slice(&encode_signed_i16(binary_scale));
        section.extend_from_slice(&encode_signed_i16(self.decimal_scale));
        section.push(bits);
        section.push(0); // Floating point

        section
    }

    fn build_section6(&self, values: &[f32]) -> Vec<u8> {
        let mut section = Vec::new();
        if !values.iter().any(|v| v.is_nan()) {
            section.extend_from_slice(&6u32.to_be_bytes());
            section.push(6);
            section.push(255);
            return section;
        }

        let mut bitmap = vec![0u8; values.len().div_ceil(8)];
        for (k, v) in values.iter().enumerate() {
            if !v.is_nan() {
                bitmap[k / 8] |= 0x80 >> (k % 8);
            }
        }
        section.extend_from_slice(&(6 + bitmap.len() as u32).to_be_bytes());
        section.push(6);
        section.push(0);
        section.extend_from_slice(&bitmap);
        section
    }

    fn build_section7(&self, values: &[f32]) -> Vec<u8> {
        let (reference, binary_scale, bits) = self.packing(values);
        let mut packed = Vec::new();

        if bits > 0 {
            let scale = 10f64.powi(self.decimal_scale as i32);
            let step = 2f64.powi(binary_scale as i32);
            for &v in values.iter().filter(|v| !v.is_nan()) {
                let x = ((v as f64 * scale - reference as f64) / step).round();
                packed.extend_from_slice(&(x.clamp(0.0, 65535.0) as u16).to_be_bytes());
            }
        }

        let mut section = Vec::new();
        section.extend_from_slice(&(5 + packed.len() as u32).to_be_bytes());
        section.push(7);
        section.extend_from_slice(&packed);
        section
    }
}

impl Default for NdfdMessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Join messages into one buffer, as in an NDFD `.bin` file.
pub fn concat_messages(messages: &[Vec<u8>]) -> Vec<u8> {
    messages.concat()
}

/// GRIB2 sign-magnitude encoding of a 32-bit integer.
pub fn encode_signed(value: i32) -> [u8; 4] {
    let magnitude = value.unsigned_abs() & 0x7FFF_FFFF;
    let raw = if value < 0 {
        magnitude | 0x8000_0000
    } else {
        magnitude
    };
    raw.to_be_bytes()
}

/// GRIB2 sign-magnitude encoding of a 16-bit integer.
pub fn encode_signed_i16(value: i16) -> [u8; 2] {
    let magnitude = value.unsigned_abs() & 0x7FFF;
    let raw = if value < 0 { magnitude | 0x8000 } else { magnitude };
    raw.to_be_bytes()
}

fn micro(degrees: f64) -> i32 {
    (degrees * 1e6).round() as i32
}

fn east_positive(lon: f64) -> f64 {
    if lon < 0.0 {
        lon + 360.0
    } else {
        lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_framing() {
        let data = NdfdMessageBuilder::rh().build();
        assert_eq!(&data[0..4], b"GRIB");
        assert_eq!(data[7], 2);
        assert_eq!(&data[data.len() - 4..], b"7777");
        let declared = u64::from_be_bytes(data[8..16].try_into().unwrap());
        assert_eq!(declared as usize, data.len());
    }

    #[test]
    fn test_statistical_template_is_longer() {
        let instant = NdfdMessageBuilder::rh().build();
        let period = NdfdMessageBuilder::min_rh().build();
        assert_eq!(period.len(), instant.len() + 24);
    }

    #[test]
    fn test_bitmap_added_for_missing_values() {
        let mut values = vec![10.0; 80];
        values[3] = f32::NAN;
        let with_gap = NdfdMessageBuilder::rh().with_data(values).build();
        let full = NdfdMessageBuilder::rh().with_gradient(0.0, 90.0).build();
        // 10 bitmap bytes, one fewer packed value, and constant data needs no bits
        assert!(with_gap.len() < full.len());
    }

    #[test]
    fn test_sign_magnitude() {
        assert_eq!(encode_signed(-1), [0x80, 0, 0, 1]);
        assert_eq!(encode_signed(5), [0, 0, 0, 5]);
        assert_eq!(encode_signed_i16(-9), [0x80, 9]);
    }
}
