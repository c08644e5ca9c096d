//! GRIB2 data unpacking.
//!
//! Simple packing (template 5.0) is decoded here. NDFD publishes most
//! fields with complex packing and spatial differencing (5.3), which is
//! handed to the `grib` crate decoder.

use std::io::Cursor;

use tracing::trace;

use crate::error::{NdfdError, NdfdResult};

/// Unpack simple packed GRIB2 data.
///
/// value = (R + X * 2^E) * 10^-D
///
/// With a bitmap, only points whose bit is set have a packed value; the
/// others come back as NaN.
pub fn unpack_simple(
    packed_data: &[u8],
    num_points: usize,
    bits_per_value: u8,
    reference_value: f32,
    binary_scale_factor: i16,
    decimal_scale_factor: i16,
    bitmap: Option<&[u8]>,
) -> NdfdResult<Vec<f32>> {
    let binary_scale = 2.0_f64.powi(binary_scale_factor as i32);
    let decimal_scale = 10.0_f64.powi(-(decimal_scale_factor as i32));
    let reference = reference_value as f64;

    let mut values = Vec::with_capacity(num_points);
    let mut bit_position = 0;
    let bits = bits_per_value as usize;

    for i in 0..num_points {
        if let Some(bm) = bitmap {
            if !bitmap_bit(bm, i) {
                values.push(f32::NAN);
                continue;
            }
        }

        let packed = if bits == 0 {
            0
        } else {
            let v = extract_bits(packed_data, bit_position, bits).map_err(|e| {
                NdfdError::UnpackingError(format!("Failed to extract bits: {}", e))
            })?;
            bit_position += bits;
            v
        };

        let value = (reference + packed as f64 * binary_scale) * decimal_scale;
        values.push(value as f32);
    }

    Ok(values)
}

/// Decode one submessage of a GRIB2 message with the `grib` crate.
pub fn decode_with_grib(message: &[u8], submessage: usize) -> NdfdResult<Vec<f32>> {
    let grib2 = grib::from_reader(Cursor::new(message))
        .map_err(|e| NdfdError::Decoder(e.to_string()))?;

    let (_, submsg) = grib2.iter().nth(submessage).ok_or_else(|| {
        NdfdError::Decoder(format!("submessage {} not found", submessage))
    })?;

    let decoder = grib::Grib2SubmessageDecoder::from(submsg)
        .map_err(|e| NdfdError::Decoder(e.to_string()))?;
    let values: Vec<f32> = decoder
        .dispatch()
        .map_err(|e| NdfdError::Decoder(e.to_string()))?
        .collect();

    trace!(submessage, points = values.len(), "Decoded with grib crate");
    Ok(values)
}

/// Bit `index` of a bitmap, MSB first. Points past the end count as present.
pub fn bitmap_bit(bitmap: &[u8], index: usize) -> bool {
    match bitmap.get(index / 8) {
        Some(byte) => (byte >> (7 - (index % 8))) & 1 == 1,
        None => true,
    }
}

/// Extract `num_bits` bits starting at `start_bit`, MSB first.
fn extract_bits(data: &[u8], start_bit: usize, num_bits: usize) -> Result<u32, String> {
    if num_bits > 32 || num_bits == 0 {
        return Err(format!("Invalid number of bits: {}", num_bits));
    }

    let mut result = 0u32;

    for i in 0..num_bits {
        let absolute_bit = start_bit + i;
        let byte_idx = absolute_bit / 8;
        let bit_idx = 7 - (absolute_bit % 8);

        if byte_idx >= data.len() {
            return Err("Not enough data to extract bits".to_string());
        }

        let bit = (data[byte_idx] >> bit_idx) & 1;
        result = (result << 1) | (bit as u32);
    }

    Ok(result)
}
