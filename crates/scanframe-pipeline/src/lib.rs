//! Frame-to-detector pipeline for live code scanning.
//!
//! The pipeline sits between a camera that produces [`Frame`]s and an
//! external [`Detector`]:
//! - frames are packed to NV21 and handed to the detector one at a time,
//! - detections are filtered against the on-screen reticle and translated
//!   into display coordinates,
//! - at most one [`ScanResult`] per cycle is posted to a [`ResultSlot`] that
//!   delivers each value to a single observer activation.
//!
//! ```
//! use scanframe_pipeline::{
//!     Candidate, DetectionPipeline, FnDetector, PipelineParams, PipelineState,
//! };
//! use scanframe_core::{Frame, Rotation, Viewport};
//!
//! let detector = FnDetector::new(|_req, done| {
//!     done.succeed(vec![Candidate { text: "hello".into(), ..Candidate::default() }]);
//! });
//! let pipeline = DetectionPipeline::with_detector(detector, PipelineParams::default());
//!
//! let frame = Frame::from_i420(4, 4, Rotation::Deg0, &[0u8; 24]).unwrap();
//! pipeline.analyze(frame, Some(Viewport::new(8, 8)));
//!
//! let result = pipeline.results().take_pending().unwrap();
//! assert_eq!(result.codes()[0].candidate.text, "hello");
//! assert_eq!(pipeline.state(), PipelineState::Paused);
//! pipeline.reset();
//! ```

mod detection;
mod io;
mod mailbox;
mod pipeline;

pub use detection::{Candidate, DetectRequest, Detector, DetectorError, FnDetector};
pub use io::PipelineIoError;
pub use mailbox::ResultSlot;
pub use pipeline::{
    Completion, DetectionPipeline, DropReason, FrameDisposition, PipelineParams, PipelineState,
    ScanResult, ScanSuccess, ScannedCode,
};

pub use scanframe_core::Frame;
