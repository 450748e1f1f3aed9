use std::sync::Arc;

use nalgebra::Point2;
use scanframe_core::GrayImage;
use serde::Serialize;

use crate::{Candidate, DetectorError};

/// An admitted code in display coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScannedCode {
    /// The detector candidate, translated into display space.
    pub candidate: Candidate,
    /// Corner polygon scaled about its center for the overlay.
    pub outline: Vec<Point2<f32>>,
}

/// Codes found in one frame.
#[derive(Clone, Debug)]
pub struct ScanSuccess {
    /// Never empty.
    pub codes: Vec<ScannedCode>,
    /// Upright luma of the analyzed crop, when preview capture is enabled.
    pub preview: Option<Arc<GrayImage>>,
    /// Sequence number of the frame the codes came from.
    pub sequence: u64,
}

/// Outcome of one analysis cycle, as delivered to the consumer.
#[derive(Clone, Debug)]
pub enum ScanResult {
    Success(ScanSuccess),
    Failure(DetectorError),
}

impl ScanResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanResult::Success(_))
    }

    /// Admitted codes; empty for failures.
    pub fn codes(&self) -> &[ScannedCode] {
        match self {
            ScanResult::Success(s) => &s.codes,
            ScanResult::Failure(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&DetectorError> {
        match self {
            ScanResult::Success(_) => None,
            ScanResult::Failure(e) => Some(e),
        }
    }
}
