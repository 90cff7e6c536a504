use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;

use pcd_rasterizer::{GeoTiffCompression, Rasterizer, DEFAULT_RESOLUTION};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompressionArg {
    None,
    Lzw,
    Deflate,
}

impl From<CompressionArg> for GeoTiffCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => GeoTiffCompression::None,
            CompressionArg::Lzw => GeoTiffCompression::Lzw,
            CompressionArg::Deflate => GeoTiffCompression::Deflate,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "pcd2tif",
    about = "A tool for converting point cloud data into an elevation GeoTIFF",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    /// LAS, LAZ, CSV or TXT point cloud
    #[arg(short, long, required = true, value_name = "FILE")]
    input: PathBuf,

    /// GeoTIFF to write
    #[arg(short, long, required = true, value_name = "FILE")]
    output: PathBuf,

    /// Cell size in the units of the input coordinates
    #[arg(short, long, default_value_t = DEFAULT_RESOLUTION)]
    resolution: f64,

    #[arg(long, value_enum, default_value_t = CompressionArg::None)]
    compression: CompressionArg,
}

fn main() -> ExitCode {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args = Cli::parse();

    log::info!("input file: {}", args.input.display());
    log::info!("output file: {}", args.output.display());
    log::info!("resolution: {}", args.resolution);
    log::info!("compression: {:?}", args.compression);

    let start = std::time::Instant::now();

    let rasterizer =
        Rasterizer::new(args.resolution).with_compression(args.compression.into());
    let raster = match rasterizer.rasterize(&args.input, &args.output) {
        Ok(raster) => raster,
        Err(e) => {
            log::error!("Failed to rasterize point cloud: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stats = &raster.stats;
    log::info!(
        "points: {}, filled cells: {}, nodata cells: {}",
        stats.point_count,
        stats.filled_cells,
        stats.nodata_cells
    );
    if let (Some(z_min), Some(z_max)) = (stats.z_min, stats.z_max) {
        log::info!("elevation range: {} .. {}", z_min, z_max);
    }

    log::info!("Elapsed: {:?}", start.elapsed());
    log::info!("Conversion finished: {}", args.output.display());

    ExitCode::SUCCESS
}
