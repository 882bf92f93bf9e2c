use std::path::{Path, PathBuf};

use crate::encode::toolchain::MediaToolchain;
use crate::foundation::error::ReelResult;

/// Combines the silent video and the combined narration into the final file.
pub struct AvMuxer<'a> {
    toolchain: &'a dyn MediaToolchain,
}

impl<'a> AvMuxer<'a> {
    /// Mux through `toolchain`.
    pub fn new(toolchain: &'a dyn MediaToolchain) -> Self {
        Self { toolchain }
    }

    /// Write `out_path`. On failure any partial `out_path` is removed before the error is
    /// returned.
    pub fn mux(&self, video: &Path, audio: &Path, out_path: &Path) -> ReelResult<PathBuf> {
        tracing::debug!(
            video = %video.display(),
            audio = %audio.display(),
            out = %out_path.display(),
            "muxing"
        );
        match self.toolchain.mux(video, audio, out_path) {
            Ok(p) => Ok(p),
            Err(failure) => {
                if let Err(e) = std::fs::remove_file(out_path)
                    && e.kind() != std::io::ErrorKind::NotFound
                {
                    tracing::warn!(
                        path = %out_path.display(),
                        error = %e,
                        "failed to remove partial output"
                    );
                }
                Err(failure.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/mux.rs"]
mod tests;
