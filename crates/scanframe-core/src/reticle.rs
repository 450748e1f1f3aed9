//! The centered square scan target.

use crate::{PixelRect, Rect};

/// Reticle side as a percentage of the shorter viewport side.
pub const RETICLE_SIZE_PERCENT: f32 = 70.0;

/// Centered square of side `0.70 * min(width, height)`.
///
/// The half side is truncated to whole pixels, so the box is exactly centered
/// (`left + right == width`) while its side may be up to one pixel short.
pub fn reticle_box(width: u32, height: u32) -> Rect {
    let side = width.min(height) as f32 * RETICLE_SIZE_PERCENT / 100.0;
    let half = (side / 2.0).trunc();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    Rect::new(cx - half, cy - half, cx + half, cy + half)
}

/// Strict rectangle-within-rectangle test used to admit candidates.
#[inline]
pub fn contains(outer: &Rect, inner: &Rect) -> bool {
    outer.contains_rect(inner)
}

/// The reticle of a raw `width x height` frame as an integer crop region.
pub fn crop_rect_to_reticle(width: u32, height: u32) -> PixelRect {
    let b = reticle_box(width, height);
    let clamp = |v: f32, max: u32| (v.max(0.0) as u32).min(max);
    PixelRect::new(
        clamp(b.left, width),
        clamp(b.top, height),
        clamp(b.right, width),
        clamp(b.bottom, height),
    )
}
