//! Mappings between analysis-frame space and display space.
//!
//! Every coordinate space knows how to express itself in a shared normalized
//! square `[0, 1] x [0, 1]`. A [`Transform`] between two spaces is then
//! `to_normalized(dst)^-1 * to_normalized(src)`, which makes the inverse the
//! transform built with the roles swapped and the identity the transform
//! between two equal spaces.
//!
//! For a frame the normalized coordinate of a detector point `p` is
//! `(p + offset) / upright_size`, where `offset` is the crop edge that ends up
//! at the top-left after rotation and `upright_size` is the frame size with
//! axes swapped for quarter turns. Mapped into a `W x H` viewport this gives
//! the familiar per-axis `(p + offset) / ratio` with `ratio = upright / view`.

use crate::{PixelRect, Rect, Rotation};
use nalgebra::{Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

/// Geometry of one analysis frame as handed to the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSpace {
    /// Raw sensor width, before rotation.
    pub width: u32,
    /// Raw sensor height, before rotation.
    pub height: u32,
    #[serde(default)]
    pub rotation: Rotation,
    /// Region actually analyzed. Defaults to the full frame when omitted.
    #[serde(default)]
    pub crop: Option<PixelRect>,
}

impl FrameSpace {
    pub fn new(width: u32, height: u32, rotation: Rotation, crop: PixelRect) -> Self {
        Self {
            width,
            height,
            rotation,
            crop: Some(crop),
        }
    }

    #[inline]
    pub fn crop_rect(&self) -> PixelRect {
        self.crop
            .unwrap_or_else(|| PixelRect::full(self.width, self.height))
    }

    /// Offset added to detector coordinates before scaling.
    ///
    /// Which crop edge feeds which axis depends on the rotation: after a
    /// quarter turn the sensor's top edge becomes the displayed left edge.
    pub fn crop_offset(&self) -> (f64, f64) {
        let c = self.crop_rect();
        let w = self.width as f64;
        let h = self.height as f64;
        match self.rotation {
            Rotation::Deg0 => (c.left as f64, c.top as f64),
            Rotation::Deg90 => (c.top as f64, c.left as f64),
            Rotation::Deg180 => (w - c.right as f64, h - c.bottom as f64),
            Rotation::Deg270 => (h - c.bottom as f64, w - c.right as f64),
        }
    }

    /// Full frame size as seen upright.
    #[inline]
    pub fn upright_size(&self) -> (u32, u32) {
        self.rotation.upright_size(self.width, self.height)
    }

    /// Crop size as seen upright; the size of the image the detector reports in.
    #[inline]
    pub fn upright_crop_size(&self) -> (u32, u32) {
        let c = self.crop_rect();
        self.rotation.upright_size(c.width(), c.height())
    }
}

/// Size of the display surface the overlay is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A viewport reports zero size until the surface has been laid out.
    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A named coordinate space a [`Transform`] can connect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateSpace {
    Frame(FrameSpace),
    Viewport(Viewport),
}

impl CoordinateSpace {
    /// Matrix taking points of this space into the shared normalized square.
    ///
    /// `None` for zero-area spaces.
    fn to_normalized(&self) -> Option<Matrix3<f64>> {
        match self {
            CoordinateSpace::Frame(f) => {
                let (w, h) = f.upright_size();
                if w == 0 || h == 0 {
                    return None;
                }
                let (ox, oy) = f.crop_offset();
                let sx = 1.0 / w as f64;
                let sy = 1.0 / h as f64;
                Some(Matrix3::new(
                    sx, 0.0, sx * ox, //
                    0.0, sy, sy * oy, //
                    0.0, 0.0, 1.0,
                ))
            }
            CoordinateSpace::Viewport(v) => {
                if !v.is_calibrated() {
                    return None;
                }
                Some(Matrix3::new(
                    1.0 / v.width as f64,
                    0.0,
                    0.0, //
                    0.0,
                    1.0 / v.height as f64,
                    0.0, //
                    0.0,
                    0.0,
                    1.0,
                ))
            }
        }
    }
}

/// Invertible 2-D mapping stored as a homogeneous 3x3 matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub m: Matrix3<f64>,
}

impl Transform {
    pub fn new(m: Matrix3<f64>) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    /// Mapping from `src` to `dst`, or `None` while either side has no area.
    ///
    /// An unavailable transform is a normal transient state (the display has
    /// not been laid out yet) and callers pass points through unchanged.
    pub fn between(src: &CoordinateSpace, dst: &CoordinateSpace) -> Option<Self> {
        let src_n = src.to_normalized()?;
        let dst_inv = dst.to_normalized()?.try_inverse()?;
        Some(Self::new(dst_inv * src_n))
    }

    /// Detector coordinates to display coordinates.
    pub fn frame_to_viewport(frame: &FrameSpace, viewport: &Viewport) -> Option<Self> {
        Self::between(
            &CoordinateSpace::Frame(*frame),
            &CoordinateSpace::Viewport(*viewport),
        )
    }

    /// Display coordinates to detector coordinates.
    pub fn viewport_to_frame(viewport: &Viewport, frame: &FrameSpace) -> Option<Self> {
        Self::between(
            &CoordinateSpace::Viewport(*viewport),
            &CoordinateSpace::Frame(*frame),
        )
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.m * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn apply_points(&self, points: &[Point2<f32>]) -> Vec<Point2<f32>> {
        points.iter().map(|&p| self.apply(p)).collect()
    }

    /// Maps all four corners and returns their bounding box.
    pub fn apply_rect(&self, r: &Rect) -> Rect {
        let mapped = r.corners().map(|p| self.apply(p));
        let mut out = Rect::new(mapped[0].x, mapped[0].y, mapped[0].x, mapped[0].y);
        for p in &mapped[1..] {
            out.left = out.left.min(p.x);
            out.top = out.top.min(p.y);
            out.right = out.right.max(p.x);
            out.bottom = out.bottom.max(p.y);
        }
        out
    }

    pub fn inverse(&self) -> Option<Self> {
        self.m.try_inverse().map(Self::new)
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Transform) -> Self {
        Self::new(next.m * self.m)
    }

    pub fn is_identity(&self, tol: f64) -> bool {
        (self.m - Matrix3::identity()).abs().max() <= tol
    }
}
