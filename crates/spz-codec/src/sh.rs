//! Spherical harmonics payload per degree.
//!
//! | degree | bytes | layout                          |
//! |--------|-------|---------------------------------|
//! | 0      | 0     |                                 |
//! | 1      | 9     | band 1                          |
//! | 2      | 24    | band 1 (9) + band 2 (15)        |
//! | 3      | 45    | band 1 (9) + band 2 (15) + band 3 (21) |
//!
//! Band 1 is quantized to multiples of 8, bands 2 and 3 to multiples of 16.
//! The stored bytes are already quantized, so decoding is a copy.

use crate::quant::{encode_sh_value, quantize_sh_band1, quantize_sh_band23};
use crate::splat::{SH1_LEN, SH2_LEN, SH3_LEN, SplatPoint};

pub const fn sh_bytes_per_point(degree: u8) -> usize {
    match degree {
        1 => SH1_LEN,
        2 => SH2_LEN,
        3 => SH2_LEN + SH3_LEN,
        _ => 0,
    }
}

fn push_band1(out: &mut Vec<u8>, coeffs: &[u8]) {
    out.extend(coeffs.iter().map(|&c| quantize_sh_band1(c)));
}

fn push_band23(out: &mut Vec<u8>, coeffs: &[u8]) {
    out.extend(coeffs.iter().map(|&c| quantize_sh_band23(c)));
}

fn push_placeholders(out: &mut Vec<u8>, count: usize) {
    out.extend(std::iter::repeat_n(encode_sh_value(0.0), count));
}

/// Band 1 then bands 2 of a full `sh2` buffer.
fn push_sh2(out: &mut Vec<u8>, sh2: &[u8; SH2_LEN]) {
    push_band1(out, &sh2[..SH1_LEN]);
    push_band23(out, &sh2[SH1_LEN..]);
}

// Each writer tries its sources in priority order and returns at the first one present.

fn write_degree1(point: &SplatPoint, out: &mut Vec<u8>) {
    if let Some(sh1) = &point.sh1 {
        return push_band1(out, sh1);
    }
    if let Some(sh2) = &point.sh2 {
        return push_band1(out, &sh2[..SH1_LEN]);
    }
    push_placeholders(out, SH1_LEN);
}

fn write_degree2(point: &SplatPoint, out: &mut Vec<u8>) {
    if let Some(sh1) = &point.sh1 {
        push_band1(out, sh1);
        return push_placeholders(out, SH2_LEN - SH1_LEN);
    }
    if let Some(sh2) = &point.sh2 {
        return push_sh2(out, sh2);
    }
    push_placeholders(out, SH2_LEN);
}

fn write_degree3(point: &SplatPoint, out: &mut Vec<u8>) {
    if let (Some(sh2), Some(sh3)) = (&point.sh2, &point.sh3) {
        push_sh2(out, sh2);
        return push_band23(out, sh3);
    }
    if let Some(sh2) = &point.sh2 {
        push_sh2(out, sh2);
        return push_placeholders(out, SH3_LEN);
    }
    if let Some(sh1) = &point.sh1 {
        push_band1(out, sh1);
        return push_placeholders(out, SH2_LEN + SH3_LEN - SH1_LEN);
    }
    push_placeholders(out, SH2_LEN + SH3_LEN);
}

/// Append the SH payload of `point` for a cloud of the given degree.
pub(crate) fn write_sh(point: &SplatPoint, degree: u8, out: &mut Vec<u8>) {
    match degree {
        1 => write_degree1(point, out),
        2 => write_degree2(point, out),
        3 => write_degree3(point, out),
        _ => {}
    }
}

/// Fill the SH buffers of `point` from its stored payload.
///
/// `bytes` must be exactly [`sh_bytes_per_point`] long for `degree`.
pub(crate) fn read_sh(point: &mut SplatPoint, degree: u8, bytes: &[u8]) {
    match degree {
        1 => point.sh1 = bytes.try_into().ok(),
        2 => point.sh2 = bytes.try_into().ok(),
        3 => {
            let (sh2, sh3) = bytes.split_at(SH2_LEN);
            point.sh2 = sh2.try_into().ok();
            point.sh3 = sh3.try_into().ok();
        }
        _ => {}
    }
}
