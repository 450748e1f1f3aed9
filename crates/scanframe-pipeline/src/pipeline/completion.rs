use std::sync::Arc;

use log::{debug, warn};
use scanframe_core::{expand_outline, Frame, GrayImage, Rect, Transform};

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{PipelineState, ScanResult, ScanSuccess, ScannedCode, Shared};
use crate::{Candidate, DetectorError};

/// State carried from `analyze` to the detector callback for one frame.
pub(crate) struct Cycle {
    pub(crate) shared: Arc<Shared>,
    pub(crate) frame: Frame,
    pub(crate) sequence: u64,
    /// Detector space to display space; `None` while uncalibrated.
    pub(crate) to_display: Option<Transform>,
    /// Reticle expressed in detector space.
    pub(crate) reticle: Rect,
    pub(crate) preview: Option<Arc<GrayImage>>,
    pub(crate) pause_on_failure: bool,
    pub(crate) outline_expand: f32,
}

/// Single-use handle a detector resolves once its work is done.
///
/// May be moved to and resolved on any thread. Dropping it without calling
/// [`Completion::resolve`] resolves it with [`DetectorError::Abandoned`], so
/// the frame is always released and the pipeline never stays busy.
pub struct Completion {
    cycle: Option<Cycle>,
}

impl Completion {
    pub(crate) fn new(cycle: Cycle) -> Self {
        Self { cycle: Some(cycle) }
    }

    /// Sequence number of the frame this completion belongs to.
    pub fn sequence(&self) -> u64 {
        self.cycle.as_ref().map_or(0, |c| c.sequence)
    }

    pub fn resolve(mut self, outcome: Result<Vec<Candidate>, DetectorError>) {
        if let Some(cycle) = self.cycle.take() {
            cycle.finish(outcome);
        }
    }

    pub fn succeed(self, candidates: Vec<Candidate>) {
        self.resolve(Ok(candidates));
    }

    pub fn fail(self, error: DetectorError) {
        self.resolve(Err(error));
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(cycle) = self.cycle.take() {
            warn!("frame #{} completion dropped unresolved", cycle.sequence);
            cycle.finish(Err(DetectorError::Abandoned));
        }
    }
}

/// Keep candidates whose bounds lie inside `reticle` and translate them.
///
/// Candidates without bounds cannot be excluded and are always kept.
pub(crate) fn admit(
    candidates: Vec<Candidate>,
    reticle: &Rect,
    to_display: Option<&Transform>,
    outline_expand: f32,
) -> Vec<ScannedCode> {
    candidates
        .into_iter()
        .filter(|c| c.bounds.as_ref().map_or(true, |b| reticle.contains_rect(b)))
        .map(|c| {
            let candidate = match to_display {
                Some(t) => c.mapped(t),
                None => c,
            };
            let outline = expand_outline(&candidate.corners, outline_expand);
            ScannedCode { candidate, outline }
        })
        .collect()
}

impl Cycle {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(sequence = self.sequence))
    )]
    fn finish(self, outcome: Result<Vec<Candidate>, DetectorError>) {
        let Cycle {
            shared,
            frame,
            sequence,
            to_display,
            reticle,
            preview,
            pause_on_failure,
            outline_expand,
        } = self;

        let (next, result) = match outcome {
            Ok(candidates) => {
                let total = candidates.len();
                let codes = admit(candidates, &reticle, to_display.as_ref(), outline_expand);
                debug!(
                    "frame #{sequence}: {} of {total} candidates inside the reticle",
                    codes.len()
                );
                if codes.is_empty() {
                    (PipelineState::Idle, None)
                } else {
                    let success = ScanSuccess {
                        codes,
                        preview,
                        sequence,
                    };
                    (PipelineState::Paused, Some(ScanResult::Success(success)))
                }
            }
            Err(err) => {
                warn!("frame #{sequence}: {err}");
                let next = if pause_on_failure {
                    PipelineState::Paused
                } else {
                    PipelineState::Idle
                };
                (next, Some(ScanResult::Failure(err)))
            }
        };

        // Hand the buffer back before anything can accept the next frame.
        frame.release();
        shared.settle(next, result);
    }
}
