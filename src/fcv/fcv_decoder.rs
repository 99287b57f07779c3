//! Keyframe sample decoding for one axis stream.

use crate::binary::Endian;
use crate::error::{FcvError, Result};
use crate::fcv::fcv_enum::{Encoding, EncodingWidths};
use crate::fcv::fcv_struct::Keyframe;
use crate::fcv::fcv_util::round_to;

/// Divisor for fixed-point value and 16-bit tangent fields.
const FIXED_POINT_SCALE: f64 = 10000.0;

/// Slope range 8-bit tangents are spread across.
const BYTE_TANGENT_MIN: f64 = -1.0;
const BYTE_TANGENT_MAX: f64 = 1.0;

/// Decimal places kept in decoded keyframes.
const OUTPUT_DIGITS: i32 = 4;

/// Decodes the samples of one axis, one per entry of `frame_ids`.
///
/// Stops quietly at the first frame whose sample does not fit in `buffer`.
pub fn decode_axis(
    buffer: &[u8],
    data_type: u8,
    frame_ids: &[u16],
    endian: Endian,
) -> Result<Vec<Keyframe>> {
    let widths = Encoding::from_data_type(data_type)
        .widths()
        .ok_or(FcvError::UnknownEncoding { data_type })?;
    decode_axis_with(buffer, widths, frame_ids, endian)
}

/// Same as [`decode_axis`] with explicit field widths.
pub fn decode_axis_with(
    buffer: &[u8],
    widths: EncodingWidths,
    frame_ids: &[u16],
    endian: Endian,
) -> Result<Vec<Keyframe>> {
    // Only the out tangent may be absent.
    for width in [widths.value_bytes, widths.tangent_in_bytes] {
        if width == 0 {
            return Err(FcvError::NumericDecode { width });
        }
    }

    let per_sample = widths.total_bytes();
    let mut keyframes = Vec::with_capacity(frame_ids.len());
    for (i, &frame) in frame_ids.iter().enumerate() {
        let start = i * per_sample;
        let Some(sample) = buffer.get(start..start + per_sample) else {
            break;
        };
        let (value_field, tangents) = sample.split_at(widths.value_bytes);
        let (in_field, out_field) = tangents.split_at(widths.tangent_in_bytes);

        let value = decode_value(value_field, endian)?;
        let tangent_in = decode_tangent(in_field, endian)?;
        let tangent_out = if widths.shares_tangent() {
            tangent_in
        } else {
            decode_tangent(out_field, endian)?
        };

        keyframes.push(Keyframe {
            frame,
            value: round_to(value, OUTPUT_DIGITS),
            tangent_in: round_to(tangent_in, OUTPUT_DIGITS),
            tangent_out: round_to(tangent_out, OUTPUT_DIGITS),
        });
    }
    Ok(keyframes)
}

/// Float as-is, narrower fields as signed fixed point.
pub fn decode_value(field: &[u8], endian: Endian) -> Result<f64> {
    match field.len() {
        4 => Ok(endian.read_f32(field) as f64),
        2 => Ok(endian.read_i16(field) as f64 / FIXED_POINT_SCALE),
        1 => Ok(field[0] as i8 as f64 / FIXED_POINT_SCALE),
        width => Err(FcvError::NumericDecode { width }),
    }
}

pub fn decode_tangent(field: &[u8], endian: Endian) -> Result<f64> {
    match field.len() {
        4 => Ok(endian.read_f32(field) as f64),
        2 => Ok(endian.read_u16(field) as f64 / FIXED_POINT_SCALE),
        1 => {
            let t = field[0] as f64 / u8::MAX as f64;
            Ok(round_to(
                BYTE_TANGENT_MIN + t * (BYTE_TANGENT_MAX - BYTE_TANGENT_MIN),
                6,
            ))
        }
        width => Err(FcvError::NumericDecode { width }),
    }
}
