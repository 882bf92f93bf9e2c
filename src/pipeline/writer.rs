use crate::encode::sink::FrameSink;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ReelResult;
use crate::render::frame::FrameRGBA;

/// Frames needed to hold a section on screen for `duration_secs`: `round(duration * fps)`, at
/// least 1.
pub fn frame_count_for(duration_secs: f64, fps: Fps) -> u64 {
    fps.secs_to_frames_round(duration_secs).max(1)
}

/// Appends sections to an open stream as runs of identical frames (hard cuts, no transitions).
pub struct SectionFrameWriter<'a> {
    sink: &'a mut dyn FrameSink,
    next: FrameIndex,
}

impl<'a> SectionFrameWriter<'a> {
    /// Write into `sink`, which must already have been started.
    pub fn new(sink: &'a mut dyn FrameSink) -> Self {
        Self {
            sink,
            next: FrameIndex(0),
        }
    }

    /// Push `frame_count` copies of `frame`; returns the number written.
    pub fn write_section(&mut self, frame: &FrameRGBA, frame_count: u64) -> ReelResult<u64> {
        for _ in 0..frame_count {
            self.sink.push_frame(self.next, frame)?;
            self.next = FrameIndex(self.next.0 + 1);
        }
        Ok(frame_count)
    }

    /// Total frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.next.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/writer.rs"]
mod tests;
