//! Quaternion compression.
//!
//! Points carry their rotation as four bytes `(w, x, y, z)`, each component
//! mapped from `[-1, 1]` with `c * 128 + 128`. On disk, version 2 files keep
//! only x, y and z (w is rebuilt from the unit norm), version 3 files use
//! "smallest three" packing into a 32 bit word.

use glam::Quat;

use crate::quant::clamp_round_u8;

/// Mask of the 9 magnitude bits of a packed component.
pub const C_MASK: u32 = 0x1FF;
/// No component but the largest of a unit quaternion can exceed this.
pub const SQRT1_2: f64 = std::f64::consts::FRAC_1_SQRT_2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationEncoding {
    /// x, y, z as one byte each.
    V2,
    /// Smallest three, 2 bit index + 3 * (sign + 9 bit magnitude).
    V3,
}

impl RotationEncoding {
    pub fn from_version(version: u32) -> Option<Self> {
        match version {
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            _ => None,
        }
    }

    pub const fn bytes_per_point(self) -> usize {
        match self {
            Self::V2 => 3,
            Self::V3 => 4,
        }
    }
}

fn byte_to_component(value: u8) -> f64 {
    f64::from(value) / 128.0 - 1.0
}

fn component_to_byte(value: f64) -> u8 {
    clamp_round_u8(value * 128.0 + 128.0)
}

/// Normalized float components in `(w, x, y, z)` order. A zero quaternion becomes the identity.
fn unit_components(rotation: [u8; 4]) -> [f64; 4] {
    let r = rotation.map(byte_to_component);
    let len = r.iter().map(|c| c * c).sum::<f64>().sqrt();
    if len > 0.0 {
        r.map(|c| c / len)
    } else {
        [1.0, 0.0, 0.0, 0.0]
    }
}

pub fn rotation_to_bytes(rotation: Quat) -> [u8; 4] {
    [rotation.w, rotation.x, rotation.y, rotation.z].map(|c| component_to_byte(f64::from(c)))
}

pub fn rotation_from_bytes(rotation: [u8; 4]) -> Quat {
    let [w, x, y, z] = rotation.map(|b| byte_to_component(b) as f32);
    Quat::from_xyzw(x, y, z, w)
}

pub fn encode_rotation_v2(rotation: [u8; 4]) -> [u8; 3] {
    let mut r = unit_components(rotation);
    if r[0] < 0.0 {
        r = r.map(|c| -c);
    }
    [r[1], r[2], r[3]].map(|c| clamp_round_u8(c * 127.5 + 127.5))
}

pub fn decode_rotation_v2(bytes: [u8; 3]) -> [u8; 4] {
    let [x, y, z] = bytes.map(|b| f64::from(b) / 127.5 - 1.0);
    let w = (1.0 - (x * x + y * y + z * z)).max(0.0).sqrt();
    [w, x, y, z].map(component_to_byte)
}

pub fn encode_rotation_v3(rotation: [u8; 4]) -> [u8; 4] {
    let mut r = unit_components(rotation);

    // Ties keep the lowest index.
    let mut largest = 0;
    for i in 1..4 {
        if r[largest].abs() < r[i].abs() {
            largest = i;
        }
    }
    // q and -q are the same rotation, make the dropped component positive.
    if r[largest] < 0.0 {
        r = r.map(|c| -c);
    }

    let mut packed = largest as u32;
    for (i, &c) in r.iter().enumerate() {
        if i == largest {
            continue;
        }
        let sign = u32::from(c < 0.0);
        let magnitude = ((f64::from(C_MASK) * (c.abs() / SQRT1_2) + 0.5) as u32).min(C_MASK);
        packed = (packed << 10) | (sign << 9) | magnitude;
    }
    packed.to_le_bytes()
}

pub fn decode_rotation_v3(bytes: [u8; 4]) -> [u8; 4] {
    let packed = u32::from_le_bytes(bytes);
    let largest = (packed >> 30) as usize;

    let mut remaining = packed;
    let mut r = [0.0f64; 4];
    let mut sum_squares = 0.0;
    for i in (0..4).rev() {
        if i == largest {
            continue;
        }
        let magnitude = f64::from(remaining & C_MASK);
        let negative = (remaining >> 9) & 1 == 1;
        remaining >>= 10;

        let c = SQRT1_2 * (magnitude / f64::from(C_MASK));
        r[i] = if negative { -c } else { c };
        sum_squares += c * c;
    }
    r[largest] = (1.0 - sum_squares).max(0.0).sqrt();

    r.map(component_to_byte)
}
