use serde::{Deserialize, Serialize};

/// Behavior switches for [`DetectionPipeline`](super::DetectionPipeline).
///
/// The reticle size is fixed at `scanframe_core::RETICLE_SIZE_PERCENT`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// After a detector failure, wait for `reset()` instead of accepting the
    /// next frame right away.
    pub pause_on_failure: bool,
    /// Attach the upright luma of the analyzed crop to every success.
    pub capture_preview: bool,
    /// Crop each frame to the reticle (in raw frame dimensions) before
    /// packing, so the detector only sees the scan region.
    pub crop_to_reticle: bool,
    /// Scale factor for the overlay outline around each admitted code.
    pub outline_expand: f32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            pause_on_failure: true,
            capture_preview: false,
            crop_to_reticle: false,
            outline_expand: 1.2,
        }
    }
}
