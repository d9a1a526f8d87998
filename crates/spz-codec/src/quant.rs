//! Scalar quantizers for the per-point fields.
//!
//! Every function here is a pure mapping between a float (or a byte in the
//! caller's convention) and the byte(s) stored in the file.

/// Zeroth order spherical harmonic basis constant.
pub const SH_C0: f64 = 0.282_094_791_773_878_14;
/// Scale applied to the SH DC term when storing colors.
pub const COLOR_SCALE: f64 = 2.0;

/// Largest / smallest value a 24 bit signed fixed point number can hold.
const FIXED24_MAX: i64 = (1 << 23) - 1;
const FIXED24_MIN: i64 = -(1 << 23);

pub(crate) fn clamp_round_u8(value: f64) -> u8 {
    // NaN falls through the clamp and casts to 0.
    value.round().clamp(0.0, 255.0) as u8
}

fn clamp_u8(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

fn clip_f32(value: f64) -> f32 {
    value.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32
}

fn fixed_point_scale(fractional_bits: u8) -> f64 {
    2f64.powi(i32::from(fractional_bits))
}

/// Encode a coordinate as a 24 bit little endian fixed point number.
///
/// Values outside the representable range saturate to the nearest end of it.
pub fn encode_position(value: f32, fractional_bits: u8) -> [u8; 3] {
    let fixed = (f64::from(value) * fixed_point_scale(fractional_bits)).round() as i64;
    let fixed = fixed.clamp(FIXED24_MIN, FIXED24_MAX) as i32;
    let [b0, b1, b2, _] = fixed.to_le_bytes();
    [b0, b1, b2]
}

pub fn decode_position(bytes: [u8; 3], fractional_bits: u8) -> f32 {
    // Place the 24 bits at the top of an i32 so the arithmetic shift back sign extends bit 23.
    let fixed = i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8;
    clip_f32(f64::from(fixed) / fixed_point_scale(fractional_bits))
}

pub fn encode_color(value: u8) -> u8 {
    let sh = (f64::from(value) / 255.0 - 0.5) / SH_C0;
    clamp_round_u8(sh * (COLOR_SCALE * 255.0) + 0.5 * 255.0)
}

pub fn decode_color(value: u8) -> u8 {
    let sh = (f64::from(value) / 255.0 - 0.5) / COLOR_SCALE;
    clamp_round_u8((sh * SH_C0 + 0.5) * 255.0)
}

/// Log scales in roughly `[-10, 5.9]` map onto the byte range in steps of 1/16.
pub fn encode_scale(value: f32) -> u8 {
    clamp_round_u8((f64::from(value) + 10.0) * 16.0)
}

pub fn decode_scale(value: u8) -> f32 {
    f32::from(value) / 16.0 - 10.0
}

/// Quantize a first band SH coefficient to a multiple of 8.
pub fn quantize_sh_band1(value: u8) -> u8 {
    clamp_u8(((f64::from(value) + 4.0) / 8.0).floor() * 8.0)
}

/// Quantize a second or third band SH coefficient to a multiple of 16.
pub fn quantize_sh_band23(value: u8) -> u8 {
    clamp_u8(((f64::from(value) + 8.0) / 16.0).floor() * 16.0)
}

/// Encode a float SH coefficient. Used for placeholder coefficients when a point has none.
pub fn encode_sh_value(value: f32) -> u8 {
    clamp_u8((f64::from(value) * 128.0).round() + 128.0)
}
