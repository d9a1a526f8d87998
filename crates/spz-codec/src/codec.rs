use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::compress::{Gzip, StreamCompressor};
use crate::error::{Result, SpzError};
use crate::header::{HEADER_SIZE, SpzHeader};
use crate::section::{SectionLayout, read_section, write_section};
use crate::splat::SpzCloud;

/// Encode a cloud to the uncompressed file layout: header followed by the data section.
pub fn encode(cloud: &SpzCloud) -> Result<Vec<u8>> {
    let layout = SectionLayout::new(&cloud.header)?;
    // The layout is sized from the header, check it before reserving anything.
    if cloud.points.len() != layout.num_points {
        return Err(SpzError::PointCountMismatch {
            header: cloud.header.num_points,
            points: cloud.points.len(),
        });
    }
    let mut out = Vec::with_capacity(HEADER_SIZE + layout.total_len());
    out.extend_from_slice(&cloud.header.to_bytes());
    write_section(&layout, cloud.header.fractional_bits, &cloud.points, &mut out)?;
    Ok(out)
}

/// Decode an uncompressed SPZ buffer.
pub fn decode(data: &[u8]) -> Result<SpzCloud> {
    let header = SpzHeader::parse(data)?;
    log::debug!(
        "SPZ v{} with {} points, SH degree {}",
        header.version,
        header.num_points,
        header.sh_degree
    );
    let layout = SectionLayout::new(&header)?;
    let points = read_section(&layout, header.fractional_bits, &data[HEADER_SIZE..])?;
    Ok(SpzCloud { header, points })
}

pub fn encode_compressed<C: StreamCompressor + ?Sized>(
    cloud: &SpzCloud,
    compressor: &C,
) -> Result<Vec<u8>> {
    let raw = encode(cloud)?;
    Ok(compressor.compress(&raw)?)
}

/// Decode a possibly compressed SPZ buffer.
///
/// If decompression fails the input is assumed to be uncompressed already.
pub fn decode_compressed<C: StreamCompressor + ?Sized>(
    data: &[u8],
    compressor: &C,
) -> Result<SpzCloud> {
    match compressor.decompress(data) {
        Ok(raw) => decode(&raw),
        Err(e) => {
            log::debug!("Decompression failed ({e}), reading input as uncompressed SPZ");
            decode(data)
        }
    }
}

/// Read a whole SPZ file from `reader`, gzip compressed or not.
pub async fn load_spz<R: AsyncRead + Unpin>(mut reader: R) -> Result<SpzCloud> {
    let mut data = vec![];
    reader.read_to_end(&mut data).await?;
    decode_compressed(&data, &Gzip::default())
}

/// Write `cloud` to `writer`, compressed if a compressor is given.
pub async fn save_spz<W: AsyncWrite + Unpin>(
    mut writer: W,
    cloud: &SpzCloud,
    compressor: Option<&dyn StreamCompressor>,
) -> Result<()> {
    let bytes = match compressor {
        Some(compressor) => encode_compressed(cloud, compressor)?,
        None => encode(cloud)?,
    };
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}
