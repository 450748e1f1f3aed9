//! The contract between the pipeline and an external code detector.

use nalgebra::Point2;
use scanframe_core::{PackedBuffer, Rect, Rotation, Transform};
use serde::{Deserialize, Serialize};

use crate::Completion;

/// One code reported by a detector.
///
/// Coordinates are in whatever space the candidate currently lives in: the
/// upright cropped image for raw detector output, display space once the
/// pipeline has translated it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Corner points in detector order.
    pub corners: Vec<Point2<f32>>,
    #[serde(default)]
    pub bounds: Option<Rect>,
    /// Raw payload bytes.
    #[serde(default)]
    pub raw: Vec<u8>,
    /// Decoded text; empty when the payload is not text.
    #[serde(default)]
    pub text: String,
}

impl Candidate {
    /// Copy of this candidate with every coordinate mapped through `t`.
    pub fn mapped(&self, t: &Transform) -> Candidate {
        Candidate {
            corners: t.apply_points(&self.corners),
            bounds: self.bounds.as_ref().map(|b| t.apply_rect(b)),
            raw: self.raw.clone(),
            text: self.text.clone(),
        }
    }
}

/// Failure reported by (or on behalf of) the detector.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    #[error("detector failed: {0}")]
    Failed(String),
    #[error("detector dropped the request without completing it")]
    Abandoned,
}

impl DetectorError {
    pub fn failed(msg: impl Into<String>) -> Self {
        DetectorError::Failed(msg.into())
    }
}

/// Everything a detector needs for one frame.
#[derive(Clone, Debug)]
pub struct DetectRequest {
    /// NV21 bytes of the cropped frame.
    pub image: PackedBuffer,
    /// Rotation that brings `image` upright; detectors report coordinates in
    /// the upright image.
    pub rotation: Rotation,
    /// Monotonic per-pipeline frame counter.
    pub sequence: u64,
}

/// An asynchronous code detector.
///
/// `detect` must return promptly; the detector resolves `completion` later,
/// from any thread. Dropping the completion unresolved counts as a failure.
pub trait Detector: Send + Sync {
    /// `false` while the detector cannot take work (e.g. still loading).
    fn is_ready(&self) -> bool {
        true
    }

    fn detect(&self, request: DetectRequest, completion: Completion);
}

/// Adapter turning a closure into a [`Detector`].
pub struct FnDetector<F>(pub F);

impl<F> FnDetector<F>
where
    F: Fn(DetectRequest, Completion) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Detector for FnDetector<F>
where
    F: Fn(DetectRequest, Completion) + Send + Sync,
{
    fn detect(&self, request: DetectRequest, completion: Completion) {
        (self.0)(request, completion)
    }
}
