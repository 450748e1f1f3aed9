use std::fmt;

use scanframe_core::{FrameError, PixelFormat};

/// Where the pipeline is in its per-frame cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Ready to accept a frame.
    #[default]
    Idle,
    /// One detection is outstanding.
    Busy,
    /// A result was surfaced and awaits `reset()`.
    Paused,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineState::Idle => "idle",
            PipelineState::Busy => "busy",
            PipelineState::Paused => "paused",
        })
    }
}

/// Why a frame was released without being analyzed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    Busy,
    Paused,
    /// The detector reported it cannot take work.
    NotReady,
    UnsupportedFormat(PixelFormat),
    /// The frame could not be packed.
    Malformed(FrameError),
}

/// What `analyze` did with a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameDisposition {
    Submitted { sequence: u64 },
    Dropped(DropReason),
}

impl FrameDisposition {
    pub fn is_submitted(&self) -> bool {
        matches!(self, FrameDisposition::Submitted { .. })
    }
}
