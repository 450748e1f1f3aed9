use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FrameSpace, PixelRect, Rotation};

/// Pixel layouts a camera can deliver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Three planes (Y, U, V) with arbitrary row and pixel strides.
    Yuv420,
    /// Y plane followed by interleaved V/U.
    Nv21,
    Rgba8888,
    Jpeg,
}

impl PixelFormat {
    /// Average storage cost per pixel; `None` for compressed formats.
    pub fn bits_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Yuv420 | PixelFormat::Nv21 => Some(12),
            PixelFormat::Rgba8888 => Some(32),
            PixelFormat::Jpeg => None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("unsupported pixel format {0:?}")]
    UnsupportedFormat(PixelFormat),
    #[error("crop rect {crop:?} exceeds frame {width}x{height}")]
    CropOutOfBounds {
        crop: PixelRect,
        width: u32,
        height: u32,
    },
    #[error("frame has {got} planes, expected at least {expected}")]
    MissingPlanes { expected: usize, got: usize },
    #[error("plane {plane} has zero row or pixel stride")]
    InvalidStride { plane: usize },
    #[error("plane {plane} too short (need {needed} bytes, have {available})")]
    PlaneTooShort {
        plane: usize,
        needed: usize,
        available: usize,
    },
    #[error("invalid I420 buffer length (expected {expected} bytes, got {got})")]
    InvalidBufferLength { expected: usize, got: usize },
}

/// One component plane of a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    pub data: Vec<u8>,
    /// Bytes between the starts of two consecutive rows.
    pub row_stride: usize,
    /// Bytes between two consecutive samples of the same row.
    pub pixel_stride: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send + 'static>;

/// A camera frame on loan from the capture pipeline.
///
/// The release hook hands the underlying buffer back to the camera and runs
/// exactly once, when the frame is dropped or explicitly released.
pub struct Frame {
    width: u32,
    height: u32,
    format: PixelFormat,
    rotation: Rotation,
    crop: PixelRect,
    planes: Vec<Plane>,
    release: Option<ReleaseHook>,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        rotation: Rotation,
        planes: Vec<Plane>,
    ) -> Self {
        Self {
            width,
            height,
            format,
            rotation,
            crop: PixelRect::full(width, height),
            planes,
            release: None,
        }
    }

    /// Build a three-plane frame from a contiguous I420 buffer
    /// (`Y`, then `U`, then `V`, chroma at half resolution rounded up).
    pub fn from_i420(
        width: u32,
        height: u32,
        rotation: Rotation,
        bytes: &[u8],
    ) -> Result<Self, FrameError> {
        let w = width as usize;
        let h = height as usize;
        let cw = w.div_ceil(2);
        let ch = h.div_ceil(2);
        let luma = w * h;
        let chroma = cw * ch;
        let expected = luma + 2 * chroma;
        if bytes.len() != expected {
            return Err(FrameError::InvalidBufferLength {
                expected,
                got: bytes.len(),
            });
        }
        let planes = vec![
            Plane::new(bytes[..luma].to_vec(), w, 1),
            Plane::new(bytes[luma..luma + chroma].to_vec(), cw, 1),
            Plane::new(bytes[luma + chroma..].to_vec(), cw, 1),
        ];
        Ok(Self::new(width, height, PixelFormat::Yuv420, rotation, planes))
    }

    /// Attach the hook that returns this frame to its producer.
    pub fn with_release<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.release = Some(Box::new(hook));
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[inline]
    pub fn crop(&self) -> PixelRect {
        self.crop
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn set_crop(&mut self, crop: PixelRect) -> Result<(), FrameError> {
        if !crop.fits_within(self.width, self.height) {
            return Err(FrameError::CropOutOfBounds {
                crop,
                width: self.width,
                height: self.height,
            });
        }
        self.crop = crop;
        Ok(())
    }

    /// Geometry of this frame for building transforms.
    pub fn space(&self) -> FrameSpace {
        FrameSpace::new(self.width, self.height, self.rotation, self.crop)
    }

    /// Hand the frame back to its producer now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        if let Some(hook) = self.release.take() {
            hook();
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("rotation", &self.rotation)
            .field("crop", &self.crop)
            .field("planes", &self.planes.len())
            .finish()
    }
}
