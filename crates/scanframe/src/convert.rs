use crate::core::{self, Frame, FrameError, GrayImageView, PackedBuffer, Rotation};

/// Neutral chroma sample; a frame built from luma alone is plain gray.
const NEUTRAL_CHROMA: u8 = 128;

/// Errors produced by the `image` conversion helpers.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Borrow an `image::GrayImage` as the lightweight `scanframe-core` view type.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Copy a core gray image (e.g. a preview snapshot) into an `image::GrayImage`.
pub fn to_image(img: &core::GrayImage) -> Result<::image::GrayImage, ConvertError> {
    let width = u32::try_from(img.width).map_err(|_| invalid(img.width, img.height))?;
    let height = u32::try_from(img.height).map_err(|_| invalid(img.width, img.height))?;
    let expected = img.width * img.height;
    if img.data.len() != expected {
        return Err(ConvertError::InvalidBuffer {
            expected,
            got: img.data.len(),
        });
    }
    ::image::GrayImage::from_raw(width, height, img.data.clone())
        .ok_or(ConvertError::InvalidDimensions { width, height })
}

/// The luma plane of a packed NV21 buffer as an `image::GrayImage`.
pub fn packed_luma(buf: &PackedBuffer) -> Result<::image::GrayImage, ConvertError> {
    let view = buf.luma();
    to_image(&core::GrayImage {
        width: view.width,
        height: view.height,
        data: view.data.to_vec(),
    })
}

/// Wrap a still grayscale image as a YUV 4:2:0 camera frame.
///
/// Chroma planes are filled with neutral gray.
pub fn frame_from_luma(
    img: &::image::GrayImage,
    rotation: Rotation,
) -> Result<Frame, ConvertError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ConvertError::InvalidDimensions { width, height });
    }
    let chroma = (width as usize).div_ceil(2) * (height as usize).div_ceil(2);
    let mut bytes = Vec::with_capacity(img.as_raw().len() + 2 * chroma);
    bytes.extend_from_slice(img.as_raw());
    bytes.resize(bytes.len() + 2 * chroma, NEUTRAL_CHROMA);
    Ok(Frame::from_i420(width, height, rotation, &bytes)?)
}

fn invalid(width: usize, height: usize) -> ConvertError {
    ConvertError::InvalidDimensions {
        width: width.min(u32::MAX as usize) as u32,
        height: height.min(u32::MAX as usize) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{pack_nv21, rotate_gray, PixelFormat};

    fn ramp(width: u32, height: u32) -> ::image::GrayImage {
        ::image::GrayImage::from_fn(width, height, |x, y| {
            ::image::Luma([(y * width + x) as u8])
        })
    }

    #[test]
    fn luma_frame_packs_to_the_same_luma() {
        let img = ramp(6, 4);
        let frame = frame_from_luma(&img, Rotation::Deg0).expect("frame");
        assert_eq!(frame.format(), PixelFormat::Yuv420);
        let packed = pack_nv21(&frame).expect("pack");
        assert_eq!(&packed.data[..24], img.as_raw().as_slice());
        assert!(packed.data[24..].iter().all(|&v| v == NEUTRAL_CHROMA));
        assert_eq!(packed_luma(&packed).expect("luma"), img);
    }

    #[test]
    fn odd_sizes_are_accepted() {
        let frame = frame_from_luma(&ramp(5, 3), Rotation::Deg90).expect("frame");
        assert_eq!((frame.width(), frame.height()), (5, 3));
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = frame_from_luma(&::image::GrayImage::new(0, 4), Rotation::Deg0).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidDimensions {
                width: 0,
                height: 4
            }
        ));
    }

    #[test]
    fn rotated_snapshot_round_trips_to_image() {
        let img = ramp(3, 2);
        let upright = rotate_gray(&gray_view(&img), Rotation::Deg270);
        let out = to_image(&upright).expect("image");
        assert_eq!(out.dimensions(), (2, 3));
        // Top-right of the source ends up top-left after a counter-clockwise turn.
        assert_eq!(out.get_pixel(0, 0).0[0], 2);
    }

    #[test]
    fn mismatched_snapshot_buffer_is_rejected() {
        let bad = core::GrayImage {
            width: 4,
            height: 4,
            data: vec![0; 3],
        };
        assert!(matches!(
            to_image(&bad),
            Err(ConvertError::InvalidBuffer {
                expected: 16,
                got: 3
            })
        ));
    }
}
