use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] when the stream is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Sink contract for consuming frames of the silent video stream.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex` values, and
/// every frame matches the geometry given to `begin`.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Called once after the last frame; the stream is complete when this returns `Ok`.
    fn end(&mut self) -> ReelResult<()>;
    /// Abandon the stream after a failure. Partial output is left for the caller to delete.
    fn abort(&mut self) {}
}

/// Consecutive identical frames, as recorded by [`InMemorySink`].
#[derive(Clone, Debug)]
pub struct FrameRun {
    /// Index of the first frame of the run.
    pub start: FrameIndex,
    /// Number of frames in the run.
    pub count: u64,
    /// The repeated frame.
    pub frame: FrameRGBA,
}

#[derive(Debug, Default)]
struct Recorded {
    cfg: Option<SinkConfig>,
    runs: Vec<FrameRun>,
    last_idx: Option<FrameIndex>,
    ended: bool,
}

/// In-memory sink for tests and debugging.
///
/// Identical consecutive frames are stored once as a [`FrameRun`]. Clones share the same record,
/// so a clone kept by the caller observes frames pushed through a boxed copy.
#[derive(Clone, Debug, Default)]
pub struct InMemorySink {
    inner: Rc<RefCell<Recorded>>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.inner.borrow().cfg
    }

    /// Recorded frame runs in stream order.
    pub fn runs(&self) -> Vec<FrameRun> {
        self.inner.borrow().runs.clone()
    }

    /// Per-run frame counts in stream order.
    pub fn run_lengths(&self) -> Vec<u64> {
        self.inner.borrow().runs.iter().map(|r| r.count).collect()
    }

    /// Total number of frames pushed.
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().runs.iter().map(|r| r.count).sum()
    }

    /// `true` once `end` has completed.
    pub fn is_ended(&self) -> bool {
        self.inner.borrow().ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        let mut rec = self.inner.borrow_mut();
        *rec = Recorded {
            cfg: Some(cfg),
            ..Recorded::default()
        };
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let mut rec = self.inner.borrow_mut();
        let cfg = rec
            .cfg
            .ok_or_else(|| ReelError::render("in-memory sink not started"))?;
        if let Some(last) = rec.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::render("sink received out-of-order frame index"));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::render(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        rec.last_idx = Some(idx);

        let extends_last = rec
            .runs
            .last()
            .is_some_and(|run| run.start.0 + run.count == idx.0 && run.frame == *frame);
        if extends_last {
            if let Some(run) = rec.runs.last_mut() {
                run.count += 1;
            }
        } else {
            rec.runs.push(FrameRun {
                start: idx,
                count: 1,
                frame: frame.clone(),
            });
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.inner.borrow_mut().ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
