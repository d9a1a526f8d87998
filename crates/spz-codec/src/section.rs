//! The data section following the header.
//!
//! Fields are grouped rather than interleaved: all positions, then all
//! alphas, colors, scales, rotations and finally all SH payloads.

use std::ops::Range;

use glam::Vec3;

use crate::error::{Result, SpzError};
use crate::header::SpzHeader;
use crate::quant::{
    decode_color, decode_position, decode_scale, encode_color, encode_position, encode_scale,
};
use crate::rotation::{
    RotationEncoding, decode_rotation_v2, decode_rotation_v3, encode_rotation_v2,
    encode_rotation_v3,
};
use crate::sh::{read_sh, sh_bytes_per_point, write_sh};
use crate::splat::SplatPoint;

const POSITION_BYTES: usize = 9;
const ALPHA_BYTES: usize = 1;
const COLOR_BYTES: usize = 3;
const SCALE_BYTES: usize = 3;

/// Byte ranges of each field group for a given header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionLayout {
    pub num_points: usize,
    pub rotation: RotationEncoding,
    pub sh_degree: u8,
    pub positions: Range<usize>,
    pub alphas: Range<usize>,
    pub colors: Range<usize>,
    pub scales: Range<usize>,
    pub rotations: Range<usize>,
    pub sh: Range<usize>,
}

impl SectionLayout {
    pub fn new(header: &SpzHeader) -> Result<Self> {
        header.validate()?;
        let rotation = RotationEncoding::from_version(header.version)
            .ok_or(SpzError::UnsupportedVersion(header.version))?;
        let num_points = header.num_points as usize;
        let sh_len = sh_bytes_per_point(header.sh_degree);

        // A section that can't be addressed can't match any buffer either.
        let too_large = || {
            let bytes_per_point = POSITION_BYTES
                + ALPHA_BYTES
                + COLOR_BYTES
                + SCALE_BYTES
                + rotation.bytes_per_point()
                + sh_len;
            SpzError::DataSizeMismatch {
                expected: u64::from(header.num_points) * bytes_per_point as u64,
                actual: usize::MAX as u64,
            }
        };

        let mut offset = 0;
        let mut next = |bytes_per_point: usize| {
            let range = group_range(offset, bytes_per_point, num_points)?;
            offset = range.end;
            Some(range)
        };
        let positions = next(POSITION_BYTES).ok_or_else(too_large)?;
        let alphas = next(ALPHA_BYTES).ok_or_else(too_large)?;
        let colors = next(COLOR_BYTES).ok_or_else(too_large)?;
        let scales = next(SCALE_BYTES).ok_or_else(too_large)?;
        let rotations = next(rotation.bytes_per_point()).ok_or_else(too_large)?;
        let sh = next(sh_len).ok_or_else(too_large)?;

        Ok(Self {
            num_points,
            rotation,
            sh_degree: header.sh_degree,
            positions,
            alphas,
            colors,
            scales,
            rotations,
            sh,
        })
    }

    pub fn bytes_per_point(&self) -> usize {
        POSITION_BYTES
            + ALPHA_BYTES
            + COLOR_BYTES
            + SCALE_BYTES
            + self.rotation.bytes_per_point()
            + sh_bytes_per_point(self.sh_degree)
    }

    pub fn total_len(&self) -> usize {
        self.sh.end
    }
}

/// Byte range of one field group starting at `start`, `None` if it overflows `usize`.
fn group_range(start: usize, bytes_per_point: usize, num_points: usize) -> Option<Range<usize>> {
    let end = bytes_per_point
        .checked_mul(num_points)
        .and_then(|len| start.checked_add(len))?;
    Some(start..end)
}

/// Append the data section for `points` to `out`.
pub fn write_section(
    layout: &SectionLayout,
    fractional_bits: u8,
    points: &[SplatPoint],
    out: &mut Vec<u8>,
) -> Result<()> {
    if points.len() != layout.num_points {
        return Err(SpzError::PointCountMismatch {
            header: layout.num_points as u32,
            points: points.len(),
        });
    }
    let _span = tracing::trace_span!("write_section", points = points.len()).entered();

    let start = out.len();
    out.reserve(layout.total_len());

    for p in points {
        for axis in p.position.to_array() {
            out.extend(encode_position(axis, fractional_bits));
        }
    }
    out.extend(points.iter().map(|p| p.alpha));
    for p in points {
        out.extend(p.color.map(encode_color));
    }
    for p in points {
        out.extend(p.scale.to_array().map(encode_scale));
    }
    match layout.rotation {
        RotationEncoding::V2 => {
            for p in points {
                out.extend(encode_rotation_v2(p.rotation));
            }
        }
        RotationEncoding::V3 => {
            for p in points {
                out.extend(encode_rotation_v3(p.rotation));
            }
        }
    }
    for p in points {
        write_sh(p, layout.sh_degree, out);
    }

    debug_assert_eq!(
        out.len() - start,
        layout.total_len(),
        "Section length doesn't match layout"
    );
    Ok(())
}

/// Decode every point of a data section. `data` must be exactly the section, no more, no less.
pub fn read_section(
    layout: &SectionLayout,
    fractional_bits: u8,
    data: &[u8],
) -> Result<Vec<SplatPoint>> {
    if data.len() != layout.total_len() {
        return Err(SpzError::DataSizeMismatch {
            expected: layout.total_len() as u64,
            actual: data.len() as u64,
        });
    }
    let _span = tracing::trace_span!("read_section", points = layout.num_points).entered();

    let mut points = vec![SplatPoint::default(); layout.num_points];

    for (p, bytes) in points
        .iter_mut()
        .zip(data[layout.positions.clone()].chunks_exact(POSITION_BYTES))
    {
        let axis = |i: usize| {
            decode_position([bytes[i], bytes[i + 1], bytes[i + 2]], fractional_bits)
        };
        p.position = Vec3::new(axis(0), axis(3), axis(6));
    }
    for (p, &alpha) in points.iter_mut().zip(&data[layout.alphas.clone()]) {
        p.alpha = alpha;
    }
    for (p, bytes) in points
        .iter_mut()
        .zip(data[layout.colors.clone()].chunks_exact(COLOR_BYTES))
    {
        p.color = [bytes[0], bytes[1], bytes[2]].map(decode_color);
    }
    for (p, bytes) in points
        .iter_mut()
        .zip(data[layout.scales.clone()].chunks_exact(SCALE_BYTES))
    {
        p.scale = Vec3::from_array([bytes[0], bytes[1], bytes[2]].map(decode_scale));
    }

    let rotations = &data[layout.rotations.clone()];
    match layout.rotation {
        RotationEncoding::V2 => {
            for (p, bytes) in points.iter_mut().zip(rotations.chunks_exact(3)) {
                p.rotation = decode_rotation_v2([bytes[0], bytes[1], bytes[2]]);
            }
        }
        RotationEncoding::V3 => {
            for (p, bytes) in points.iter_mut().zip(rotations.chunks_exact(4)) {
                p.rotation = decode_rotation_v3([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
        }
    }

    let sh_len = sh_bytes_per_point(layout.sh_degree);
    if sh_len > 0 {
        for (p, bytes) in points
            .iter_mut()
            .zip(data[layout.sh.clone()].chunks_exact(sh_len))
        {
            read_sh(p, layout.sh_degree, bytes);
        }
    }

    Ok(points)
}
