use glam::{Quat, Vec3};

use crate::header::SpzHeader;
use crate::rotation::{rotation_from_bytes, rotation_to_bytes};

/// Number of first band SH coefficients (3 per channel).
pub const SH1_LEN: usize = 9;
/// First and second band SH coefficients (8 per channel).
pub const SH2_LEN: usize = 24;
/// Third band SH coefficients (7 per channel).
pub const SH3_LEN: usize = 21;

/// A single gaussian as it is read from or written to an SPZ file.
///
/// Colors, rotation and SH coefficients are kept in their byte form. The
/// rotation is `(w, x, y, z)` with each component stored as `c * 128 + 128`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplatPoint {
    pub position: Vec3,
    /// Log scale per axis.
    pub scale: Vec3,
    pub rotation: [u8; 4],
    pub color: [u8; 3],
    pub alpha: u8,
    pub sh1: Option<[u8; SH1_LEN]>,
    /// Bands one and two. The first [`SH1_LEN`] bytes overlap with `sh1`.
    pub sh2: Option<[u8; SH2_LEN]>,
    pub sh3: Option<[u8; SH3_LEN]>,
}

impl SplatPoint {
    pub fn rotation_quat(&self) -> Quat {
        rotation_from_bytes(self.rotation)
    }

    pub fn set_rotation_quat(&mut self, rotation: Quat) {
        self.rotation = rotation_to_bytes(rotation.normalize());
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpzCloud {
    pub header: SpzHeader,
    pub points: Vec<SplatPoint>,
}

impl SpzCloud {
    /// Build a cloud with a default header describing `points`.
    ///
    /// # Panics
    /// If there are more than `u32::MAX` points.
    pub fn new(version: u32, sh_degree: u8, points: Vec<SplatPoint>) -> Self {
        let num_points = u32::try_from(points.len()).expect("Too many points for an SPZ file");
        Self {
            header: SpzHeader::new(version, num_points, sh_degree),
            points,
        }
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }
}
