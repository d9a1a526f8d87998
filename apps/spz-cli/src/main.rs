use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use spz_codec::{
    ExportConfig, HEADER_SIZE, RotationEncoding, SectionLayout, SpzHeader, StreamCompressor,
    load_spz, save_spz,
};

#[derive(Parser)]
#[command(author, version, about = "Inspect and convert SPZ gaussian splat files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the header and section layout of a file.
    Info {
        path: PathBuf,
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Re-encode a file, optionally changing its version or SH degree.
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[clap(flatten)]
        export: ExportConfig,
    },
}

#[derive(Serialize)]
struct FileInfo {
    header: SpzHeader,
    rotation_bytes: usize,
    bytes_per_point: usize,
    uncompressed_size: usize,
}

async fn info(path: &Path, json: bool) -> anyhow::Result<()> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let cloud = load_spz(file)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let layout = SectionLayout::new(&cloud.header)?;

    let info = FileInfo {
        header: cloud.header,
        rotation_bytes: layout.rotation.bytes_per_point(),
        bytes_per_point: layout.bytes_per_point(),
        uncompressed_size: HEADER_SIZE + layout.total_len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let header = &info.header;
        let scheme = match layout.rotation {
            RotationEncoding::V2 => "xyz bytes",
            RotationEncoding::V3 => "smallest three",
        };
        println!("version:         {} ({scheme})", header.version);
        println!("points:          {}", header.num_points);
        println!("sh degree:       {}", header.sh_degree);
        println!("fractional bits: {}", header.fractional_bits);
        println!("flags:           {:#04x}", header.flags);
        println!("bytes / point:   {}", info.bytes_per_point);
        println!("raw size:        {}", info.uncompressed_size);
    }
    Ok(())
}

async fn convert(input: &Path, output: &Path, export: &ExportConfig) -> anyhow::Result<()> {
    let file = tokio::fs::File::open(input)
        .await
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let cloud = load_spz(file)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    log::info!(
        "Loaded {} points (v{}, SH degree {})",
        cloud.num_points(),
        cloud.header.version,
        cloud.header.sh_degree
    );

    let cloud = export.apply(&cloud);
    let compressor = export.compressor();
    let file = tokio::fs::File::create(output)
        .await
        .with_context(|| format!("Failed to create {}", output.display()))?;
    save_spz(
        file,
        &cloud,
        compressor.as_ref().map(|c| c as &dyn StreamCompressor),
    )
    .await
    .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Wrote {} (v{}, SH degree {})",
        output.display(),
        cloud.header.version,
        cloud.header.sh_degree
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to initialize tokio runtime")?;

    runtime.block_on(async move {
        match args.command {
            Command::Info { path, json } => info(&path, json).await,
            Command::Convert {
                input,
                output,
                export,
            } => convert(&input, &output, &export).await,
        }
    })
}
