//! Core geometry and buffer handling for live code scanning.
//!
//! This crate knows nothing about detectors or threads. It covers:
//! - camera frames with planar components, crop and rotation metadata,
//! - repacking YUV 4:2:0 planes into the contiguous NV21 layout detectors
//!   expect,
//! - transforms between analysis-frame space and display space,
//! - the centered reticle used to admit detections.

mod frame;
mod geometry;
mod image;
mod logger;
mod nv21;
mod outline;
mod reticle;
mod transform;

pub use frame::{Frame, FrameError, PixelFormat, Plane};
pub use geometry::{InvalidRotation, PixelRect, Rect, Rotation};
pub use image::{rotate_gray, GrayImage, GrayImageView};
pub use nv21::{pack_nv21, PackedBuffer};
pub use outline::expand_outline;
pub use reticle::{contains, crop_rect_to_reticle, reticle_box, RETICLE_SIZE_PERCENT};
pub use transform::{CoordinateSpace, FrameSpace, Transform, Viewport};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, LOG_ENV};

pub use nalgebra::Point2;
