use clap::Args;
use serde::{Deserialize, Serialize};

use crate::compress::Gzip;
use crate::header::MAX_SH_DEGREE;
use crate::splat::SpzCloud;

fn parse_version(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(v @ 2..=3) => Ok(v),
        Ok(v) => Err(format!("SPZ version must be 2 or 3, got {v}")),
        Err(e) => Err(format!("Invalid version '{s}': {e}")),
    }
}

fn parse_sh_degree(s: &str) -> Result<u8, String> {
    match s.parse::<u8>() {
        Ok(d) if d <= MAX_SH_DEGREE => Ok(d),
        Ok(d) => Err(format!("SH degree must be at most {MAX_SH_DEGREE}, got {d}")),
        Err(e) => Err(format!("Invalid SH degree '{s}': {e}")),
    }
}

#[derive(Clone, Debug, Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExportConfig {
    /// Format version to write. 3 stores rotations with higher precision.
    #[arg(
        long = "format-version",
        help_heading = "Export options",
        default_value = "3",
        value_parser = parse_version
    )]
    pub version: u32,
    /// SH degree to write. Keeps the source degree if not set.
    #[arg(long, help_heading = "Export options", value_parser = parse_sh_degree)]
    pub sh_degree: Option<u8>,
    /// Gzip level, 0-9.
    #[arg(long, help_heading = "Export options", default_value = "6")]
    pub compression_level: u32,
    /// Write the raw layout without gzip.
    #[arg(long, help_heading = "Export options", default_value = "false")]
    pub uncompressed: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            version: 3,
            sh_degree: None,
            compression_level: 6,
            uncompressed: false,
        }
    }
}

impl ExportConfig {
    /// A copy of `cloud` with a header targeting this config.
    ///
    /// Point data is untouched, the SH buffers are resized to the target degree when encoding.
    pub fn apply(&self, cloud: &SpzCloud) -> SpzCloud {
        let mut header = cloud.header;
        header.version = self.version;
        if let Some(sh_degree) = self.sh_degree {
            header.sh_degree = sh_degree;
        }
        SpzCloud {
            header,
            points: cloud.points.clone(),
        }
    }

    pub fn compressor(&self) -> Option<Gzip> {
        (!self.uncompressed).then(|| Gzip::new(self.compression_level))
    }
}
