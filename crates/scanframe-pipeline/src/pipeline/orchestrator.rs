use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use scanframe_core::{
    crop_rect_to_reticle, pack_nv21, reticle_box, rotate_gray, Frame, FrameError, FrameSpace,
    GrayImage, PackedBuffer, PixelFormat, Rect, Transform, Viewport,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{
    Completion, Cycle, DropReason, FrameDisposition, PipelineParams, PipelineState, ScanResult,
};
use crate::{DetectRequest, Detector, ResultSlot};

/// State shared between the capture worker and detector callbacks.
pub(crate) struct Shared {
    state: Mutex<PipelineState>,
    pub(crate) results: ResultSlot<ScanResult>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> PipelineState {
        *self.lock_state()
    }

    pub(crate) fn set_state(&self, next: PipelineState) {
        Self::transition(&mut self.lock_state(), next);
    }

    /// Move to `next` and store `result` under one state lock, then deliver.
    ///
    /// `reset` takes the same lock, so it either sees `Paused` together with
    /// the stored result or neither of them.
    pub(crate) fn settle(&self, next: PipelineState, result: Option<ScanResult>) {
        let staged = {
            let mut state = self.lock_state();
            Self::transition(&mut state, next);
            let staged = result.is_some();
            if let Some(result) = result {
                self.results.stage(result);
            }
            staged
        };
        if staged {
            self.results.deliver();
        }
    }

    fn transition(state: &mut PipelineState, next: PipelineState) {
        if *state != next {
            debug!("pipeline {} -> {}", *state, next);
        }
        *state = next;
    }
}

/// Everything derived from a frame before it goes to the detector.
struct Prepared {
    packed: PackedBuffer,
    to_display: Option<Transform>,
    reticle: Rect,
    preview: Option<Arc<GrayImage>>,
}

/// Backpressured frame-to-detector orchestrator.
///
/// `analyze` is meant to be called from a single capture worker; detector
/// completions may arrive on any thread.
pub struct DetectionPipeline {
    shared: Arc<Shared>,
    detector: Arc<dyn Detector>,
    params: PipelineParams,
    sequence: AtomicU64,
}

impl DetectionPipeline {
    pub fn new(detector: Arc<dyn Detector>, params: PipelineParams) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PipelineState::Idle),
                results: ResultSlot::new(),
            }),
            detector,
            params,
            sequence: AtomicU64::new(0),
        }
    }

    /// Convenience constructor taking the detector by value.
    pub fn with_detector<D>(detector: D, params: PipelineParams) -> Self
    where
        D: Detector + 'static,
    {
        Self::new(Arc::new(detector), params)
    }

    #[inline]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    pub fn state(&self) -> PipelineState {
        self.shared.state()
    }

    /// Mailbox the consumer observes for results.
    pub fn results(&self) -> &ResultSlot<ScanResult> {
        &self.shared.results
    }

    /// Offer one frame for detection.
    ///
    /// `viewport` is the current display size, `None` (or zero-sized) until
    /// the display has been laid out; results then stay in detector space.
    /// The frame is always released: immediately when dropped, otherwise once
    /// the detector completes.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip_all,
            fields(
                width = frame.width(),
                height = frame.height(),
                rotation = frame.rotation().degrees()
            )
        )
    )]
    pub fn analyze(&self, mut frame: Frame, viewport: Option<Viewport>) -> FrameDisposition {
        if let Err(reason) = self.try_begin(&frame) {
            debug!("dropping frame: {reason:?}");
            frame.release();
            return FrameDisposition::Dropped(reason);
        }

        let prepared = match self.prepare(&mut frame, viewport) {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!("dropping malformed frame: {err}");
                frame.release();
                self.shared.set_state(PipelineState::Idle);
                return FrameDisposition::Dropped(DropReason::Malformed(err));
            }
        };

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let rotation = frame.rotation();
        let Prepared {
            packed,
            to_display,
            reticle,
            preview,
        } = prepared;
        if to_display.is_none() {
            debug!("frame #{sequence}: display not calibrated, results stay in image space");
        }

        let cycle = Cycle {
            shared: self.shared.clone(),
            frame,
            sequence,
            to_display,
            reticle,
            preview,
            pause_on_failure: self.params.pause_on_failure,
            outline_expand: self.params.outline_expand,
        };
        let request = DetectRequest {
            image: packed,
            rotation,
            sequence,
        };
        self.detector.detect(request, Completion::new(cycle));
        FrameDisposition::Submitted { sequence }
    }

    /// Acknowledge a shown result: `Paused -> Idle`, dropping the retained
    /// result together with its preview.
    ///
    /// Outside `Paused` this does nothing, so an in-flight detection and its
    /// upcoming result are left alone.
    pub fn reset(&self) {
        let stale = {
            let mut state = self.shared.lock_state();
            if *state != PipelineState::Paused {
                return;
            }
            // Taken before leaving Paused: no cycle can post in between.
            let stale = self.shared.results.take();
            Shared::transition(&mut state, PipelineState::Idle);
            stale
        };
        drop(stale);
    }

    /// Claim the pipeline for `frame`, or say why not.
    fn try_begin(&self, frame: &Frame) -> Result<(), DropReason> {
        if frame.format() != PixelFormat::Yuv420 {
            return Err(DropReason::UnsupportedFormat(frame.format()));
        }
        if !self.detector.is_ready() {
            return Err(DropReason::NotReady);
        }
        let mut state = self.shared.lock_state();
        match *state {
            PipelineState::Idle => {
                *state = PipelineState::Busy;
                Ok(())
            }
            PipelineState::Busy => Err(DropReason::Busy),
            PipelineState::Paused => Err(DropReason::Paused),
        }
    }

    fn prepare(
        &self,
        frame: &mut Frame,
        viewport: Option<Viewport>,
    ) -> Result<Prepared, FrameError> {
        if self.params.crop_to_reticle {
            frame.set_crop(crop_rect_to_reticle(frame.width(), frame.height()))?;
        }
        let packed = pack_nv21(frame)?;

        let space = frame.space();
        let to_display = viewport.and_then(|v| Transform::frame_to_viewport(&space, &v));
        let reticle = detector_space_reticle(&space, viewport, to_display.as_ref());
        let preview = self
            .params
            .capture_preview
            .then(|| Arc::new(rotate_gray(&packed.luma(), frame.rotation())));

        Ok(Prepared {
            packed,
            to_display,
            reticle,
            preview,
        })
    }
}

/// The display reticle pulled back into detector space, or the reticle of
/// the upright crop itself when no display transform is available.
fn detector_space_reticle(
    space: &FrameSpace,
    viewport: Option<Viewport>,
    to_display: Option<&Transform>,
) -> Rect {
    if let (Some(v), Some(inv)) = (viewport, to_display.and_then(Transform::inverse)) {
        return inv.apply_rect(&reticle_box(v.width, v.height));
    }
    let (w, h) = space.upright_crop_size();
    reticle_box(w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanframe_core::{PixelRect, Rotation};

    #[test]
    fn uncalibrated_reticle_covers_upright_crop() {
        let space = FrameSpace::new(200, 100, Rotation::Deg90, PixelRect::full(200, 100));
        // upright crop is 100x200, so the box is 70 wide, centered at (50, 100)
        let r = detector_space_reticle(&space, None, None);
        assert_eq!(r, Rect::new(15.0, 65.0, 85.0, 135.0));
    }

    #[test]
    fn calibrated_reticle_is_pulled_back_into_the_frame() {
        let space = FrameSpace::new(640, 480, Rotation::Deg0, PixelRect::full(640, 480));
        let view = Viewport::new(1280, 960);
        let t = Transform::frame_to_viewport(&space, &view);
        let r = detector_space_reticle(&space, Some(view), t.as_ref());
        // display box 304..976 x 144..816, halved
        assert!((r.left - 152.0).abs() < 1e-3);
        assert!((r.top - 72.0).abs() < 1e-3);
        assert!((r.right - 488.0).abs() < 1e-3);
        assert!((r.bottom - 408.0).abs() < 1e-3);
    }
}
