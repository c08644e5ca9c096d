//! Splitting NDFD files into GRIB2 messages and messages into fields.
//!
//! A message may repeat sections 2-7 (or 3-7, or 4-7) for several fields;
//! every Section 7 closes one field using the most recent sections seen.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{NdfdError, NdfdResult};
use crate::sections::{
    parse_bitmap, parse_data_representation, parse_data_section, parse_grid_definition,
    parse_identification, parse_indicator, parse_product_definition, section_length,
    DataRepresentation, GridDefinition, Identification, ProductDefinition,
};
use crate::unpacking::{decode_with_grib, unpack_simple};

/// One field of a GRIB2 message with everything needed to decode it.
#[derive(Debug, Clone)]
pub struct RawField<'a> {
    pub discipline: u8,
    pub identification: Identification,
    pub grid: GridDefinition,
    pub product: ProductDefinition,
    pub representation: DataRepresentation,
    pub bitmap: Option<Bytes>,
    pub data: Bytes,
    /// The whole message, for decoders that work on submessages
    pub message: &'a [u8],
    pub submessage_index: usize,
}

impl RawField<'_> {
    /// Decode the field values in file scan order, NaN for missing points.
    pub fn decode_values(&self) -> NdfdResult<Vec<f32>> {
        let num_points = self.grid.num_data_points as usize;
        let values = match self.representation.template_number {
            0 => unpack_simple(
                &self.data,
                num_points,
                self.representation.bits_per_value,
                self.representation.reference_value,
                self.representation.binary_scale_factor,
                self.representation.decimal_scale_factor,
                self.bitmap.as_deref(),
            )?,
            _ => decode_with_grib(self.message, self.submessage_index)?,
        };

        if values.len() != num_points {
            return Err(NdfdError::UnpackingError(format!(
                "expected {} values, decoded {}",
                num_points,
                values.len()
            )));
        }
        Ok(values)
    }
}

/// Split a buffer of concatenated GRIB2 messages.
///
/// Bytes between messages (padding, headers from WMO bulletins) are skipped.
pub fn split_messages(buf: &[u8]) -> NdfdResult<Vec<&[u8]>> {
    let mut messages = Vec::new();
    let mut offset = 0;

    while let Some(start) = find_magic(buf, offset) {
        let indicator = parse_indicator(&buf[start..])?;
        let length = indicator.message_length as usize;
        let end = start + length;

        if length < 16 || end > buf.len() {
            return Err(NdfdError::InvalidFormat(format!(
                "message at byte {} declares length {} but only {} bytes remain",
                start,
                length,
                buf.len() - start
            )));
        }
        if &buf[end - 4..end] != b"7777" {
            return Err(NdfdError::InvalidFormat(format!(
                "message at byte {} is missing its end marker",
                start
            )));
        }

        messages.push(&buf[start..end]);
        offset = end;
    }

    debug!(count = messages.len(), bytes = buf.len(), "Split GRIB2 messages");
    Ok(messages)
}

/// Walk the sections of one message and assemble its fields.
pub fn parse_message(message: &[u8]) -> NdfdResult<Vec<RawField<'_>>> {
    let indicator = parse_indicator(message)?;

    let mut identification: Option<Identification> = None;
    let mut grid: Option<GridDefinition> = None;
    let mut product: Option<ProductDefinition> = None;
    let mut representation: Option<DataRepresentation> = None;
    let mut bitmap: Option<Bytes> = None;
    let mut previous_bitmap: Option<Bytes> = None;
    let mut fields = Vec::new();

    let mut offset = 16;
    loop {
        if message.len() >= offset + 4 && &message[offset..offset + 4] == b"7777" {
            break;
        }
        if offset + 5 > message.len() {
            return Err(NdfdError::InvalidFormat(
                "message ended before Section 8".to_string(),
            ));
        }

        let section = &message[offset..];
        let length = section_length(section);
        if length < 5 || offset + length > message.len() {
            return Err(NdfdError::InvalidSection {
                section: section[4],
                reason: "Invalid section length".to_string(),
            });
        }
        let section = &section[..length];

        match section[4] {
            1 => identification = Some(parse_identification(section)?),
            2 => {}
            3 => grid = Some(parse_grid_definition(section)?),
            4 => product = Some(parse_product_definition(section)?),
            5 => representation = Some(parse_data_representation(section)?),
            6 => {
                let parsed = parse_bitmap(section)?;
                bitmap = match parsed.indicator {
                    0 => {
                        previous_bitmap = Some(parsed.data.clone());
                        Some(parsed.data)
                    }
                    254 => previous_bitmap.clone(),
                    255 => None,
                    other => {
                        warn!(indicator = other, "Predefined bitmaps are not supported");
                        return Err(NdfdError::InvalidSection {
                            section: 6,
                            reason: format!("Unsupported bitmap indicator {}", other),
                        });
                    }
                };
            }
            7 => {
                let data = parse_data_section(section)?.data;
                let missing = |n: u8| NdfdError::InvalidSection {
                    section: n,
                    reason: "Section missing before data section".to_string(),
                };
                fields.push(RawField {
                    discipline: indicator.discipline,
                    identification: identification.clone().ok_or_else(|| missing(1))?,
                    grid: grid.clone().ok_or_else(|| missing(3))?,
                    product: product.clone().ok_or_else(|| missing(4))?,
                    representation: representation.clone().ok_or_else(|| missing(5))?,
                    bitmap: bitmap.clone(),
                    data,
                    message,
                    submessage_index: fields.len(),
                });
            }
            other => {
                return Err(NdfdError::InvalidSection {
                    section: other,
                    reason: "Unknown section number".to_string(),
                })
            }
        }

        offset += length;
    }

    Ok(fields)
}

fn find_magic(buf: &[u8], from: usize) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }
    buf[from..]
        .windows(4)
        .position(|w| w == b"GRIB")
        .map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_messages() {
        assert!(split_messages(b"not a grib file").unwrap().is_empty());
    }

    #[test]
    fn test_truncated_message() {
        let mut data = b"GRIB".to_vec();
        data.extend_from_slice(&[0, 0, 0, 2]);
        data.extend_from_slice(&500u64.to_be_bytes());
        assert!(split_messages(&data).is_err());
    }
}
