//! Repacking of three-plane YUV 4:2:0 frames into contiguous NV21.
//!
//! ```text
//! Y plane            U plane    V plane          NV21 output
//! Y Y Y Y Y Y Y Y    U U U U    V V V V          Y Y Y Y Y Y Y Y
//! Y Y Y Y Y Y Y Y    U U U U    V V V V          ...
//! ...                ...        ...              V U V U V U V U
//! ```
//!
//! Only the crop region is copied. Chroma planes are addressed with the crop
//! edges halved.

use crate::{Frame, FrameError, GrayImageView, PixelFormat, PixelRect};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// NV21 bytes for the cropped region of one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedBuffer {
    /// Crop width.
    pub width: u32,
    /// Crop height.
    pub height: u32,
    pub data: Vec<u8>,
}

impl PackedBuffer {
    /// Expected byte length for a `width x height` NV21 image.
    pub fn expected_len(width: u32, height: u32) -> usize {
        let bits = PixelFormat::Yuv420.bits_per_pixel().unwrap_or(12);
        width as usize * height as usize * bits / 8
    }

    /// The leading luma plane.
    pub fn luma(&self) -> GrayImageView<'_> {
        let n = self.width as usize * self.height as usize;
        GrayImageView {
            width: self.width as usize,
            height: self.height as usize,
            data: &self.data[..n],
        }
    }
}

/// Where one source plane lands in the output.
struct PlaneLayout {
    output_stride: usize,
    output_offset: usize,
    crop: PixelRect,
}

fn plane_layout(index: usize, crop: PixelRect, pixel_count: usize) -> Option<PlaneLayout> {
    // Chroma sits at half resolution. The block count is bounded by the halved
    // crop size so odd crop offsets never overrun the output.
    let chroma = || {
        let left = crop.left / 2;
        let top = crop.top / 2;
        PixelRect::new(
            left,
            top,
            left + crop.width() / 2,
            top + crop.height() / 2,
        )
    };
    match index {
        0 => Some(PlaneLayout {
            output_stride: 1,
            output_offset: 0,
            crop,
        }),
        // U fills the odd slots after the luma block.
        1 => Some(PlaneLayout {
            output_stride: 2,
            output_offset: pixel_count + 1,
            crop: chroma(),
        }),
        // V fills the even slots.
        2 => Some(PlaneLayout {
            output_stride: 2,
            output_offset: pixel_count,
            crop: chroma(),
        }),
        _ => None,
    }
}

/// Repack the cropped region of a [`PixelFormat::Yuv420`] frame into NV21.
///
/// The output is always exactly `crop_w * crop_h * 12 / 8` bytes. Planes past
/// the third are ignored.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame), fields(crop = ?frame.crop()))
)]
pub fn pack_nv21(frame: &Frame) -> Result<PackedBuffer, FrameError> {
    if frame.format() != PixelFormat::Yuv420 {
        return Err(FrameError::UnsupportedFormat(frame.format()));
    }
    let planes = frame.planes();
    if planes.len() < 3 {
        return Err(FrameError::MissingPlanes {
            expected: 3,
            got: planes.len(),
        });
    }

    let crop = frame.crop();
    if !crop.fits_within(frame.width(), frame.height()) {
        return Err(FrameError::CropOutOfBounds {
            crop,
            width: frame.width(),
            height: frame.height(),
        });
    }

    let pixel_count = crop.area();
    let mut out = vec![0u8; PackedBuffer::expected_len(crop.width(), crop.height())];

    for (index, plane) in planes.iter().enumerate() {
        let Some(layout) = plane_layout(index, crop, pixel_count) else {
            continue;
        };
        let width = layout.crop.width() as usize;
        let height = layout.crop.height() as usize;
        if width == 0 || height == 0 {
            continue;
        }
        if plane.row_stride == 0 || plane.pixel_stride == 0 {
            return Err(FrameError::InvalidStride { plane: index });
        }

        let bulk = plane.pixel_stride == 1 && layout.output_stride == 1;
        // The last sample of a strided row is followed by nothing, so only
        // (width - 1) full strides plus one byte are guaranteed to exist.
        let row_len = if bulk {
            width
        } else {
            (width - 1) * plane.pixel_stride + 1
        };

        let mut offset = layout.output_offset;
        for row in 0..height {
            let start = (row + layout.crop.top as usize) * plane.row_stride
                + layout.crop.left as usize * plane.pixel_stride;
            let src = plane
                .data
                .get(start..start + row_len)
                .ok_or(FrameError::PlaneTooShort {
                    plane: index,
                    needed: start + row_len,
                    available: plane.data.len(),
                })?;

            if bulk {
                out[offset..offset + row_len].copy_from_slice(src);
                offset += row_len;
            } else {
                for col in 0..width {
                    out[offset] = src[col * plane.pixel_stride];
                    offset += layout.output_stride;
                }
            }
        }
    }

    Ok(PackedBuffer {
        width: crop.width(),
        height: crop.height(),
        data: out,
    })
}
