//! scanframe CLI: inspect reticle geometry, map points between frame and
//! display space, and repack raw frames.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::info;
use scanframe::convert::{frame_from_luma, packed_luma, to_image, ConvertError};
use scanframe::core::{
    crop_rect_to_reticle, pack_nv21, reticle_box, rotate_gray, Frame, FrameError, FrameSpace,
    InvalidRotation, PackedBuffer, Point2, Rotation, Transform, Viewport,
};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Rotation(#[from] InvalidRotation),
    #[error("display {width}x{height} is not laid out; no transform available")]
    Uncalibrated { width: u32, height: u32 },
    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "scanframe")]
#[command(about = "Frame geometry and NV21 utilities for live code scanning")]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reticle box of a display as JSON.
    Reticle {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },

    /// Map a point from detector space to display space.
    Map(MapArgs),

    /// Repack a raw I420 file into NV21.
    Pack(PackArgs),

    /// Write the upright luma snapshot of a still image treated as a frame.
    Preview(PreviewArgs),
}

#[derive(Debug, Clone, Args)]
struct MapArgs {
    /// JSON file with `frame` and `viewport` geometry.
    #[arg(long)]
    config: PathBuf,
    #[arg(long, allow_hyphen_values = true)]
    x: f32,
    #[arg(long, allow_hyphen_values = true)]
    y: f32,
    /// Map from display space back to detector space instead.
    #[arg(long)]
    inverse: bool,
}

#[derive(Debug, Clone, Args)]
struct PackArgs {
    /// Raw I420 input (Y, then U, then V).
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    width: u32,
    #[arg(long)]
    height: u32,
    /// Only pack the square under the reticle.
    #[arg(long)]
    crop_to_reticle: bool,
    /// NV21 output path.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct PreviewArgs {
    /// Input image; converted to 8-bit luma.
    #[arg(long)]
    image: PathBuf,
    /// Clockwise rotation in degrees that brings the image upright.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    rotation: i32,
    /// Only keep the square under the reticle.
    #[arg(long)]
    crop_to_reticle: bool,
    #[arg(long)]
    output: PathBuf,
}

/// Geometry consumed by `map`.
#[derive(Debug, Deserialize)]
struct MapConfig {
    frame: FrameSpace,
    viewport: Viewport,
}

#[derive(Debug, Serialize)]
struct MappedPoint {
    x: f32,
    y: f32,
}

#[derive(Debug, Serialize)]
struct PackSummary {
    width: u32,
    height: u32,
    bytes: usize,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.verbose).and_then(|_| run(cli.command)) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) -> CliResult<()> {
    use log::LevelFilter;

    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    scanframe::core::init_with_level(level)?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8) -> CliResult<()> {
    scanframe::core::init_tracing(false);
    Ok(())
}

fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Reticle { width, height } => run_reticle(width, height),
        Commands::Map(args) => run_map(&args),
        Commands::Pack(args) => run_pack(&args),
        Commands::Preview(args) => run_preview(&args),
    }
}

fn read(path: &Path) -> CliResult<Vec<u8>> {
    fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── reticle ───────────────────────────────────────────────────────────

fn run_reticle(width: u32, height: u32) -> CliResult<()> {
    print_json(&reticle_box(width, height))
}

// ── map ───────────────────────────────────────────────────────────────

fn run_map(args: &MapArgs) -> CliResult<()> {
    let config: MapConfig = serde_json::from_slice(&read(&args.config)?)?;
    let MapConfig { frame, viewport } = config;
    let transform = if args.inverse {
        Transform::viewport_to_frame(&viewport, &frame)
    } else {
        Transform::frame_to_viewport(&frame, &viewport)
    }
    .ok_or(CliError::Uncalibrated {
        width: viewport.width,
        height: viewport.height,
    })?;

    let p = transform.apply(Point2::new(args.x, args.y));
    info!("({}, {}) -> ({}, {})", args.x, args.y, p.x, p.y);
    print_json(&MappedPoint { x: p.x, y: p.y })
}

// ── pack ──────────────────────────────────────────────────────────────

fn run_pack(args: &PackArgs) -> CliResult<()> {
    let raw = read(&args.input)?;
    let mut frame = Frame::from_i420(args.width, args.height, Rotation::Deg0, &raw)?;
    let packed = pack_frame(&mut frame, args.crop_to_reticle)?;

    fs::write(&args.output, &packed.data).map_err(|source| CliError::Write {
        path: args.output.clone(),
        source,
    })?;
    info!(
        "packed {}x{} NV21 to {}",
        packed.width,
        packed.height,
        args.output.display()
    );
    print_json(&PackSummary {
        width: packed.width,
        height: packed.height,
        bytes: packed.data.len(),
    })
}

fn pack_frame(frame: &mut Frame, crop_to_reticle: bool) -> CliResult<PackedBuffer> {
    if crop_to_reticle {
        frame.set_crop(crop_rect_to_reticle(frame.width(), frame.height()))?;
    }
    Ok(pack_nv21(frame)?)
}

// ── preview ───────────────────────────────────────────────────────────

fn run_preview(args: &PreviewArgs) -> CliResult<()> {
    let rotation = Rotation::from_degrees(args.rotation)?;
    info!("Loading image: {}", args.image.display());
    let img = image::ImageReader::open(&args.image)
        .map_err(|source| CliError::Read {
            path: args.image.clone(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| CliError::Read {
            path: args.image.clone(),
            source,
        })?
        .decode()?
        .to_luma8();

    let mut frame = frame_from_luma(&img, rotation)?;
    let packed = pack_frame(&mut frame, args.crop_to_reticle)?;
    let snapshot = if rotation == Rotation::Deg0 {
        packed_luma(&packed)?
    } else {
        to_image(&rotate_gray(&packed.luma(), rotation))?
    };

    snapshot.save(&args.output)?;
    info!(
        "wrote {}x{} preview to {}",
        snapshot.width(),
        snapshot.height(),
        args.output.display()
    );
    Ok(())
}
