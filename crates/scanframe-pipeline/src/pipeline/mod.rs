//! Per-frame detection lifecycle.
//!
//! [`DetectionPipeline::analyze`] is called by the capture worker for every
//! frame. At most one frame is with the detector at a time; frames arriving
//! while it is busy (or while a shown result awaits [`DetectionPipeline::reset`])
//! are released immediately rather than queued.

mod completion;
mod orchestrator;
mod params;
mod result;
mod state;

pub use completion::Completion;
pub use orchestrator::DetectionPipeline;
pub use params::PipelineParams;
pub use result::{ScanResult, ScanSuccess, ScannedCode};
pub use state::{DropReason, FrameDisposition, PipelineState};

pub(crate) use completion::Cycle;
pub(crate) use orchestrator::Shared;
