//! GRIB2 section parsing.
//!
//! Each parser takes the bytes of one section, starting at its 4-byte
//! length header. Offsets in comments are 0-based within the section.
//! Signed integers in GRIB2 use sign-magnitude, not two's complement.

use bytes::Bytes;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::{NdfdError, NdfdResult};

const MISSING_U32: u32 = 0xFFFF_FFFF;

/// Section 0: Indicator Section (16 bytes)
#[derive(Debug, Clone)]
pub struct Indicator {
    pub discipline: u8,
    pub edition: u8,
    pub message_length: u64,
}

/// Section 1: Identification Section
#[derive(Debug, Clone)]
pub struct Identification {
    pub center: u16,
    pub sub_center: u16,
    pub table_version: u8,
    pub local_table_version: u8,
    pub significance_of_reference_time: u8,
    pub reference_time: DateTime<Utc>,
    pub production_status: u8,
    pub data_type: u8,
}

/// Template-specific part of the grid definition.
#[derive(Debug, Clone, PartialEq)]
pub enum GridTemplate {
    /// Template 3.0, all angles in degrees.
    LatLon {
        la1: f64,
        lo1: f64,
        la2: f64,
        lo2: f64,
        di: f64,
        dj: f64,
    },
    /// Template 3.30, angles in degrees and spacing in meters.
    Lambert {
        la1: f64,
        lo1: f64,
        lad: f64,
        lov: f64,
        dx: f64,
        dy: f64,
        projection_centre: u8,
        latin1: f64,
        latin2: f64,
    },
}

/// Section 3: Grid Definition Section
#[derive(Debug, Clone)]
pub struct GridDefinition {
    pub template_number: u16,
    pub num_data_points: u32,
    pub shape_of_earth: u8,
    pub earth_radius: f64,
    /// Points along a parallel (columns)
    pub ni: u32,
    /// Points along a meridian (rows)
    pub nj: u32,
    pub scanning_mode: u8,
    pub template: GridTemplate,
}

/// Statistical processing applied over a time range (Code Table 4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticalProcess {
    Average,
    Accumulation,
    Maximum,
    Minimum,
    Other(u8),
}

impl From<u8> for StatisticalProcess {
    fn from(code: u8) -> Self {
        match code {
            0 => StatisticalProcess::Average,
            1 => StatisticalProcess::Accumulation,
            2 => StatisticalProcess::Maximum,
            3 => StatisticalProcess::Minimum,
            other => StatisticalProcess::Other(other),
        }
    }
}

/// Section 4: Product Definition Section
#[derive(Debug, Clone)]
pub struct ProductDefinition {
    pub template_number: u16,
    pub parameter_category: u8,
    pub parameter_number: u8,
    pub generating_process: u8,
    /// Code Table 4.4 unit of `forecast_time`
    pub time_range_unit: u8,
    pub forecast_time: u32,
    pub level_type: u8,
    pub level_value: Option<f64>,
    /// End of the overall time interval (template 4.8)
    pub end_of_interval: Option<DateTime<Utc>>,
    pub statistical_process: Option<StatisticalProcess>,
}

impl ProductDefinition {
    /// Offset of the forecast (or period start) from the reference time.
    pub fn forecast_offset(&self) -> NdfdResult<Duration> {
        time_range_duration(self.time_range_unit, self.forecast_time as i64)
    }
}

/// Section 5: Data Representation Section
#[derive(Debug, Clone)]
pub struct DataRepresentation {
    pub num_data_points: u32,
    pub template_number: u16,
    pub reference_value: f32,
    pub binary_scale_factor: i16,
    pub decimal_scale_factor: i16,
    pub bits_per_value: u8,
    pub original_data_type: u8,
}

/// Section 6: Bitmap Section
#[derive(Debug, Clone)]
pub struct Bitmap {
    /// 0 = bitmap follows, 254 = reuse previous, 255 = none
    pub indicator: u8,
    pub data: Bytes,
}

/// Section 7: Data Section
#[derive(Debug, Clone)]
pub struct DataSection {
    pub data: Bytes,
}

// ===== Parsing Functions =====

/// Parse Section 0 (Indicator) from the start of a message
pub fn parse_indicator(data: &[u8]) -> NdfdResult<Indicator> {
    if data.len() < 16 {
        return Err(NdfdError::InvalidFormat(
            "Not enough data for indicator section".to_string(),
        ));
    }

    if &data[0..4] != b"GRIB" {
        return Err(NdfdError::InvalidFormat(
            "Invalid GRIB magic bytes".to_string(),
        ));
    }

    // Octets 5-6 reserved, 7 discipline, 8 edition, 9-16 total length
    let discipline = data[6];
    let edition = data[7];
    if edition != 2 {
        return Err(NdfdError::InvalidFormat(format!(
            "Expected GRIB edition 2, got {}",
            edition
        )));
    }

    let mut len = [0u8; 8];
    len.copy_from_slice(&data[8..16]);

    Ok(Indicator {
        discipline,
        edition,
        message_length: u64::from_be_bytes(len),
    })
}

/// Parse Section 1 (Identification)
pub fn parse_identification(section: &[u8]) -> NdfdResult<Identification> {
    require(section, 1, 21)?;

    let center = read_u16(section, 5);
    let sub_center = read_u16(section, 7);
    let year = read_u16(section, 12);
    let (month, day, hour, minute, second) = (
        section[14], section[15], section[16], section[17], section[18],
    );

    let reference_time = datetime(year, month, day, hour, minute, second).ok_or_else(|| {
        NdfdError::InvalidSection {
            section: 1,
            reason: format!(
                "Invalid date: {}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ),
        }
    })?;

    Ok(Identification {
        center,
        sub_center,
        table_version: section[9],
        local_table_version: section[10],
        significance_of_reference_time: section[11],
        reference_time,
        production_status: section[19],
        data_type: section[20],
    })
}

/// Parse Section 3 (Grid Definition), templates 3.0 and 3.30
pub fn parse_grid_definition(section: &[u8]) -> NdfdResult<GridDefinition> {
    require(section, 3, 14)?;

    let num_data_points = read_u32(section, 6);
    let template_number = read_u16(section, 12);

    // Template data starts at byte 14; the earth shape block is shared
    let gd = &section[14..];

    match template_number {
        0 => {
            require(gd, 3, 58)?;
            let ni = read_u32(gd, 16);
            let nj = read_u32(gd, 20);
            let basic_angle = read_u32(gd, 24);
            let subdivisions = read_u32(gd, 28);
            let unit = angle_unit(basic_angle, subdivisions);

            Ok(GridDefinition {
                template_number,
                num_data_points,
                shape_of_earth: gd[0],
                earth_radius: earth_radius(gd),
                ni,
                nj,
                scanning_mode: gd[57],
                template: GridTemplate::LatLon {
                    la1: decode_grib2_signed(&gd[32..36]) as f64 * unit,
                    lo1: decode_grib2_signed(&gd[36..40]) as f64 * unit,
                    la2: decode_grib2_signed(&gd[41..45]) as f64 * unit,
                    lo2: decode_grib2_signed(&gd[45..49]) as f64 * unit,
                    di: read_u32(gd, 49) as f64 * unit,
                    dj: read_u32(gd, 53) as f64 * unit,
                },
            })
        }
        30 => {
            require(gd, 3, 59)?;
            let micro = 1e-6;

            Ok(GridDefinition {
                template_number,
                num_data_points,
                shape_of_earth: gd[0],
                earth_radius: earth_radius(gd),
                ni: read_u32(gd, 16),
                nj: read_u32(gd, 20),
                scanning_mode: gd[50],
                template: GridTemplate::Lambert {
                    la1: decode_grib2_signed(&gd[24..28]) as f64 * micro,
                    lo1: read_u32(gd, 28) as f64 * micro,
                    lad: decode_grib2_signed(&gd[33..37]) as f64 * micro,
                    lov: read_u32(gd, 37) as f64 * micro,
                    dx: read_u32(gd, 41) as f64 / 1000.0,
                    dy: read_u32(gd, 45) as f64 / 1000.0,
                    projection_centre: gd[49],
                    latin1: decode_grib2_signed(&gd[51..55]) as f64 * micro,
                    latin2: decode_grib2_signed(&gd[55..59]) as f64 * micro,
                },
            })
        }
        other => Err(NdfdError::UnsupportedTemplate {
            section: 3,
            template: other,
        }),
    }
}

/// Parse Section 4 (Product Definition), templates 4.0 and 4.8
pub fn parse_product_definition(section: &[u8]) -> NdfdResult<ProductDefinition> {
    require(section, 4, 34)?;

    // Bytes 5-6: number of coordinate values after the template
    // Bytes 7-8: product definition template number
    let template_number = read_u16(section, 7);
    if template_number != 0 && template_number != 8 {
        return Err(NdfdError::UnsupportedTemplate {
            section: 4,
            template: template_number,
        });
    }

    // Shared horizontal-level layout (templates 4.0 through 4.15):
    // 9 category, 10 number, 11 generating process, 17 time unit,
    // 18-21 forecast time, 22 first surface type, 23 scale, 24-27 value
    let level_type = section[22];
    let level_value = scaled_value(section[23], read_u32(section, 24));

    let mut product = ProductDefinition {
        template_number,
        parameter_category: section[9],
        parameter_number: section[10],
        generating_process: section[11],
        time_range_unit: section[17],
        forecast_time: read_u32(section, 18),
        level_type,
        level_value,
        end_of_interval: None,
        statistical_process: None,
    };

    if template_number == 8 {
        // 34-40 end of overall time interval, 41 number of time ranges,
        // 42-45 missing values, 46 statistical process of the first range
        require(section, 4, 58)?;
        let end = datetime(
            read_u16(section, 34),
            section[36],
            section[37],
            section[38],
            section[39],
            section[40],
        )
        .ok_or_else(|| NdfdError::InvalidSection {
            section: 4,
            reason: "Invalid end of overall time interval".to_string(),
        })?;
        product.end_of_interval = Some(end);
        product.statistical_process = Some(StatisticalProcess::from(section[46]));
    }

    Ok(product)
}

/// Parse Section 5 (Data Representation)
pub fn parse_data_representation(section: &[u8]) -> NdfdResult<DataRepresentation> {
    require(section, 5, 21)?;

    // 5-8 number of data points, 9-10 template number; templates 5.0, 5.2,
    // 5.3, 5.40 and 5.41 share the next ten bytes:
    // 11-14 reference value (IEEE float), 15-16 binary scale E,
    // 17-18 decimal scale D, 19 bits per value, 20 original field type
    let reference_value = f32::from_be_bytes([section[11], section[12], section[13], section[14]]);

    Ok(DataRepresentation {
        num_data_points: read_u32(section, 5),
        template_number: read_u16(section, 9),
        reference_value,
        binary_scale_factor: decode_grib2_signed_i16(&section[15..17]),
        decimal_scale_factor: decode_grib2_signed_i16(&section[17..19]),
        bits_per_value: section[19],
        original_data_type: section[20],
    })
}

/// Parse Section 6 (Bitmap)
pub fn parse_bitmap(section: &[u8]) -> NdfdResult<Bitmap> {
    require(section, 6, 6)?;
    let length = section_length(section);

    let data = if section[5] == 0 && length > 6 {
        Bytes::copy_from_slice(&section[6..length])
    } else {
        Bytes::new()
    };

    Ok(Bitmap {
        indicator: section[5],
        data,
    })
}

/// Parse Section 7 (Data)
pub fn parse_data_section(section: &[u8]) -> NdfdResult<DataSection> {
    require(section, 7, 5)?;
    let length = section_length(section);

    Ok(DataSection {
        data: Bytes::copy_from_slice(&section[5..length]),
    })
}

// ===== Helper Functions =====

/// Decode a GRIB2 sign-magnitude 32-bit integer. Returns 0 for slices
/// that are not exactly 4 bytes long.
pub fn decode_grib2_signed(bytes: &[u8]) -> i32 {
    if bytes.len() != 4 {
        return 0;
    }
    let raw = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let magnitude = (raw & 0x7FFF_FFFF) as i32;
    if raw & 0x8000_0000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Decode a GRIB2 sign-magnitude 16-bit integer.
pub fn decode_grib2_signed_i16(bytes: &[u8]) -> i16 {
    if bytes.len() != 2 {
        return 0;
    }
    let raw = u16::from_be_bytes([bytes[0], bytes[1]]);
    let magnitude = (raw & 0x7FFF) as i16;
    if raw & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Convert a Code Table 4.4 unit and count into a duration.
pub fn time_range_duration(unit: u8, count: i64) -> NdfdResult<Duration> {
    let duration = match unit {
        0 => Duration::minutes(count),
        1 => Duration::hours(count),
        2 => Duration::days(count),
        10 => Duration::hours(3 * count),
        11 => Duration::hours(6 * count),
        12 => Duration::hours(12 * count),
        13 => Duration::seconds(count),
        other => {
            return Err(NdfdError::InvalidSection {
                section: 4,
                reason: format!("Unsupported time range unit {}", other),
            })
        }
    };
    Ok(duration)
}

/// Declared length of the section starting at `section[0]`.
pub fn section_length(section: &[u8]) -> usize {
    if section.len() < 4 {
        return 0;
    }
    read_u32(section, 0) as usize
}

fn require(section: &[u8], number: u8, len: usize) -> NdfdResult<()> {
    if section.len() < len {
        return Err(NdfdError::InvalidSection {
            section: number,
            reason: format!("Not enough data: need {} bytes, got {}", len, section.len()),
        });
    }
    Ok(())
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn datetime(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, second as u32))
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Scale factor (sign-magnitude byte) applied to a scaled value; None when missing.
fn scaled_value(scale: u8, value: u32) -> Option<f64> {
    if scale == 0xFF || value == MISSING_U32 {
        return None;
    }
    let magnitude = (scale & 0x7F) as i32;
    let factor = if scale & 0x80 != 0 { -magnitude } else { magnitude };
    Some(value as f64 * 10f64.powi(-factor))
}

/// Unit of latitude/longitude values in template 3.0.
fn angle_unit(basic_angle: u32, subdivisions: u32) -> f64 {
    if basic_angle == 0
        || basic_angle == MISSING_U32
        || subdivisions == 0
        || subdivisions == MISSING_U32
    {
        1e-6
    } else {
        basic_angle as f64 / subdivisions as f64
    }
}

/// Earth radius from the shape-of-earth block (Code Table 3.2).
fn earth_radius(gd: &[u8]) -> f64 {
    match gd[0] {
        0 => 6_367_470.0,
        1 => scaled_value(gd[1], read_u32(gd, 2)).unwrap_or(6_371_229.0),
        8 => 6_371_200.0,
        _ => 6_371_229.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_i16() {
        assert_eq!(decode_grib2_signed_i16(&[0x00, 0x05]), 5);
        assert_eq!(decode_grib2_signed_i16(&[0x80, 0x05]), -5);
        assert_eq!(decode_grib2_signed_i16(&[0x80]), 0);
    }

    #[test]
    fn test_scaled_value() {
        assert_eq!(scaled_value(0, 2), Some(2.0));
        assert_eq!(scaled_value(1, 25), Some(2.5));
        assert_eq!(scaled_value(0xFF, 0), None);
    }

    #[test]
    fn test_time_units() {
        assert_eq!(time_range_duration(1, 12).unwrap(), Duration::hours(12));
        assert_eq!(time_range_duration(11, 2).unwrap(), Duration::hours(12));
        assert!(time_range_duration(7, 1).is_err());
    }

    #[test]
    fn test_indicator_rejects_grib1() {
        let mut data = vec![0u8; 16];
        data[0..4].copy_from_slice(b"GRIB");
        data[7] = 1;
        assert!(parse_indicator(&data).is_err());
    }
}
