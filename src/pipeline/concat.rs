use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::toolchain::MediaToolchain;
use crate::foundation::error::{ReelError, ReelResult};
use crate::pipeline::artifacts::Artifacts;

/// Where one section's narration comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipSource {
    /// An existing narration clip.
    File(PathBuf),
    /// A synthesized silent clip of the given length, for sections whose clip is unusable.
    Silence {
        /// Section index, used to name the clip.
        index: usize,
        /// Length in seconds.
        secs: f64,
    },
}

/// Render a concat-demuxer manifest: one `file '<path>'` line per clip, in order.
///
/// Single quotes inside paths are closed, escaped and reopened (`'\''`).
pub fn render_concat_manifest(clips: &[PathBuf]) -> String {
    let mut out = String::new();
    for clip in clips {
        out.push_str("file '");
        out.push_str(&clip.to_string_lossy().replace('\'', "'\\''"));
        out.push_str("'\n");
    }
    out
}

/// Parse the `file` entries of a concat manifest written by [`render_concat_manifest`].
///
/// Blank lines, comments and other directives are skipped.
pub fn parse_concat_manifest(text: &str) -> Vec<PathBuf> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("file "))
        .map(|quoted| {
            let quoted = quoted.trim();
            let inner = quoted
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(quoted);
            PathBuf::from(inner.replace("'\\''", "'"))
        })
        .collect()
}

/// Joins per-section narration into one track, in section order, without re-encoding.
pub struct AudioConcatenator<'a> {
    toolchain: &'a dyn MediaToolchain,
}

impl<'a> AudioConcatenator<'a> {
    /// Concatenate through `toolchain`.
    pub fn new(toolchain: &'a dyn MediaToolchain) -> Self {
        Self { toolchain }
    }

    /// Materialize silent stand-ins, write the manifest to `artifacts.concat_list` and join the
    /// clips into `artifacts.combined_audio`.
    pub fn concatenate(
        &self,
        clips: &[ClipSource],
        artifacts: &mut Artifacts,
    ) -> ReelResult<PathBuf> {
        if clips.is_empty() {
            return Err(ReelError::validation("no narration clips to concatenate"));
        }

        let mut paths = Vec::with_capacity(clips.len());
        for clip in clips {
            let path = match clip {
                ClipSource::File(path) => path.clone(),
                ClipSource::Silence { index, secs } => {
                    let out = artifacts.silence_clip(*index);
                    tracing::info!(section = index, secs, "synthesizing silent narration");
                    self.toolchain.synthesize_silence(*secs, &out)?
                }
            };
            paths.push(absolute(&path));
        }

        let manifest = render_concat_manifest(&paths);
        std::fs::write(&artifacts.concat_list, manifest)
            .with_context(|| format!("write concat list '{}'", artifacts.concat_list.display()))?;
        tracing::debug!(
            clips = paths.len(),
            manifest = %artifacts.concat_list.display(),
            "concatenating narration"
        );

        Ok(self
            .toolchain
            .concatenate(&artifacts.concat_list, &artifacts.combined_audio)?)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/concat.rs"]
mod tests;
