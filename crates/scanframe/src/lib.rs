//! High-level facade crate for the `scanframe-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the core and pipeline crates
//! - (feature-gated) conversions between `image::GrayImage` and the
//!   lightweight frame and snapshot types, so still images can be fed through
//!   the same path as camera frames.
//!
//! ## Quickstart
//!
//! ```no_run
//! use std::sync::Arc;
//! use scanframe::convert::frame_from_luma;
//! use scanframe::pipeline::{DetectionPipeline, FnDetector, PipelineParams};
//! use scanframe::core::{Rotation, Viewport};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("label.png")?.decode()?.to_luma8();
//! let detector = FnDetector::new(|_req, done| done.succeed(Vec::new()));
//! let pipeline = DetectionPipeline::new(Arc::new(detector), PipelineParams::default());
//!
//! let frame = frame_from_luma(&img, Rotation::Deg0)?;
//! let outcome = pipeline.analyze(frame, Some(Viewport::new(1080, 1920)));
//! println!("{outcome:?}, state {}", pipeline.state());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `scanframe::core`: frames, NV21 packing, rotation, transforms, reticle.
//! - `scanframe::pipeline`: detector contract, `DetectionPipeline`, result mailbox.
//! - `scanframe::convert` (feature `image`): helpers around `image::GrayImage`.

pub use scanframe_core as core;
pub use scanframe_pipeline as pipeline;

pub use scanframe_core::{Frame, FrameSpace, Rotation, Transform, Viewport};
pub use scanframe_pipeline::{DetectionPipeline, Detector, PipelineParams, ScanResult};

#[cfg(feature = "image")]
pub mod convert;
