use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpzError {
    #[error("Invalid SPZ file: insufficient data for header ({len} bytes).")]
    InsufficientHeaderData { len: usize },

    #[error("Invalid SPZ file: magic number mismatch (found {found:#010x}).")]
    MagicMismatch { found: u32 },

    #[error("Unsupported SPZ version: {0}")]
    UnsupportedVersion(u32),

    #[error("Unsupported SH degree: {0}")]
    UnsupportedShDegree(u8),

    #[error("Unsupported fractional bits: {0}")]
    UnsupportedFractionalBits(u8),

    #[error("Invalid SPZ data: expected {expected} bytes of splat data, got {actual}.")]
    DataSizeMismatch { expected: u64, actual: u64 },

    #[error("Header declares {header} points but {points} were supplied.")]
    PointCountMismatch { header: u32, points: usize },

    #[error("IO error while reading or writing SPZ data.")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpzError>;
