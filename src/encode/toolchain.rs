use std::path::{Path, PathBuf};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{ReelResult, ToolResult};

/// The only seam between the pipeline and external media binaries.
///
/// Every operation blocks until the tool has finished and reports a typed result; callers never
/// infer success from the presence of output files.
pub trait MediaToolchain {
    /// Open the silent video stream at `out_path` and call [`FrameSink::begin`] with `cfg`.
    ///
    /// Failures map to [`crate::ReelError::StreamOpen`].
    fn open_video_stream(&self, out_path: &Path, cfg: SinkConfig)
    -> ReelResult<Box<dyn FrameSink>>;

    /// Concatenate the clips listed in `manifest` (concat demuxer syntax) into `out_path` without
    /// re-encoding.
    fn concatenate(&self, manifest: &Path, out_path: &Path) -> ToolResult<PathBuf>;

    /// Combine `video` and `audio` into `out_path`, copying video and encoding audio to AAC.
    fn mux(&self, video: &Path, audio: &Path, out_path: &Path) -> ToolResult<PathBuf>;

    /// Write `duration_secs` of silence to `out_path` in the narration clip format.
    fn synthesize_silence(&self, duration_secs: f64, out_path: &Path) -> ToolResult<PathBuf>;
}
