use serde::{Deserialize, Serialize};

use crate::error::{Result, SpzError};

/// Size of the fixed file header in bytes.
pub const HEADER_SIZE: usize = 16;
/// "NGSP" read as a little-endian u32.
pub const SPZ_MAGIC: u32 = 0x5053_474e;
/// The only fixed-point precision this format supports for positions.
pub const FRACTIONAL_BITS: u8 = 12;
pub const MAX_SH_DEGREE: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpzHeader {
    pub magic: u32,
    pub version: u32,
    pub num_points: u32,
    pub sh_degree: u8,
    pub fractional_bits: u8,
    pub flags: u8,
    pub reserved: u8,
}

impl SpzHeader {
    pub fn new(version: u32, num_points: u32, sh_degree: u8) -> Self {
        Self {
            magic: SPZ_MAGIC,
            version,
            num_points,
            sh_degree,
            fractional_bits: FRACTIONAL_BITS,
            flags: 0,
            reserved: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.num_points.to_le_bytes());
        bytes[12] = self.sh_degree;
        bytes[13] = self.fractional_bits;
        bytes[14] = self.flags;
        bytes[15] = self.reserved;
        bytes
    }

    /// Parse and validate the header at the start of `data`. Trailing bytes are ignored.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let Some(bytes) = data.first_chunk::<HEADER_SIZE>() else {
            return Err(SpzError::InsufficientHeaderData { len: data.len() });
        };

        let read_u32 = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        let header = Self {
            magic: read_u32(0),
            version: read_u32(4),
            num_points: read_u32(8),
            sh_degree: bytes[12],
            fractional_bits: bytes[13],
            flags: bytes[14],
            reserved: bytes[15],
        };
        header.validate()?;
        Ok(header)
    }

    /// Checks run in a fixed order, the first violation wins.
    pub fn validate(&self) -> Result<()> {
        if self.magic != SPZ_MAGIC {
            return Err(SpzError::MagicMismatch { found: self.magic });
        }
        if !(2..=3).contains(&self.version) {
            return Err(SpzError::UnsupportedVersion(self.version));
        }
        if self.sh_degree > MAX_SH_DEGREE {
            return Err(SpzError::UnsupportedShDegree(self.sh_degree));
        }
        if self.fractional_bits != FRACTIONAL_BITS {
            return Err(SpzError::UnsupportedFractionalBits(self.fractional_bits));
        }
        Ok(())
    }
}
