//! Reading and writing of SPZ compressed gaussian splat files.
//!
//! An SPZ file is a 16 byte header followed by a field-grouped data section,
//! the whole buffer gzip compressed. Positions are 24 bit fixed point, colors
//! and scales are single bytes and rotations use one of two quaternion
//! compression schemes depending on the format version.

pub mod codec;
pub mod compress;
pub mod config;
pub mod error;
pub mod header;
pub mod quant;
pub mod rotation;
pub mod section;
pub mod sh;
pub mod splat;

#[cfg(test)]
mod tests;

pub use codec::{decode, decode_compressed, encode, encode_compressed, load_spz, save_spz};
pub use compress::{Gzip, StreamCompressor};
pub use config::ExportConfig;
pub use error::{Result, SpzError};
pub use header::{HEADER_SIZE, SPZ_MAGIC, SpzHeader};
pub use rotation::RotationEncoding;
pub use section::SectionLayout;
pub use splat::{SplatPoint, SpzCloud};
