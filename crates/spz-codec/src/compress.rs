use std::io::{Read, Write};

use flate2::{Compression, read::MultiGzDecoder, write::GzEncoder};

/// Whole-buffer compression applied around the encoded file.
pub trait StreamCompressor {
    fn compress(&self, input: &[u8]) -> std::io::Result<Vec<u8>>;
    fn decompress(&self, input: &[u8]) -> std::io::Result<Vec<u8>>;
}

/// Gzip, the compressor SPZ files are written with.
#[derive(Clone, Copy, Debug)]
pub struct Gzip {
    level: Compression,
}

impl Gzip {
    /// Levels above 9 fall back to the default level.
    pub fn new(level: u32) -> Self {
        let level = match level {
            0..=9 => Compression::new(level),
            _ => Compression::default(),
        };
        Self { level }
    }
}

impl Default for Gzip {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl StreamCompressor for Gzip {
    fn compress(&self, input: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut enc = GzEncoder::new(Vec::with_capacity(input.len() / 2), self.level);
        enc.write_all(input)?;
        enc.finish()
    }

    /// Concatenated gzip members decode as one stream.
    fn decompress(&self, input: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut dec = MultiGzDecoder::new(input);
        let mut out = Vec::new();
        dec.read_to_end(&mut out)?;
        Ok(out)
    }
}
