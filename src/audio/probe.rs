use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::encode::process::run_tool;
use crate::foundation::error::{ReelError, ReelResult, ToolStage};

/// Reads a clip's playback duration from its container metadata.
pub trait DurationSource {
    /// Duration of `path` in seconds.
    fn duration_secs(&self, path: &Path) -> ReelResult<f64>;
}

/// [`DurationSource`] backed by the system `ffprobe`.
#[derive(Clone, Debug)]
pub struct FfprobeDuration {
    bin: PathBuf,
    timeout: Option<Duration>,
}

impl FfprobeDuration {
    /// Probe with the `ffprobe` executable at `bin`.
    pub fn new(bin: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }
}

impl DurationSource for FfprobeDuration {
    fn duration_secs(&self, path: &Path) -> ReelResult<f64> {
        let mut cmd = Command::new(&self.bin);
        cmd.args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(path);
        let stdout = run_tool(ToolStage::Probe, cmd, self.timeout)?;
        parse_ffprobe_duration(&stdout)
    }
}

/// Extract `format.duration` from `ffprobe -print_format json -show_format` output.
pub(crate) fn parse_ffprobe_duration(json: &[u8]) -> ReelResult<f64> {
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ReelError::render(format!("ffprobe json parse failed: {e}")))?;
    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| ReelError::render("ffprobe reported no container duration"))?;
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|e| ReelError::render(format!("invalid ffprobe duration '{raw}': {e}")))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ReelError::render(format!(
            "ffprobe duration must be finite and > 0, got {secs}"
        )));
    }
    Ok(secs)
}

/// Why a clip's duration fell back to the configured default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// No file exists at the expected path.
    Missing,
    /// The file exists but its duration could not be read.
    Unreadable,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Missing => "missing",
            Self::Unreadable => "unreadable",
        })
    }
}

/// Outcome of probing one narration clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbedDuration {
    /// Duration in seconds.
    pub secs: f64,
    /// Set when the fallback duration was used.
    pub fallback: Option<FallbackReason>,
}

/// Narration duration probe: absent or unreadable clips get a fixed fallback duration.
pub struct AudioDurationProbe {
    source: Box<dyn DurationSource>,
    fallback_secs: f64,
}

impl AudioDurationProbe {
    /// Wrap `source`, substituting `fallback_secs` on failure.
    pub fn new(source: Box<dyn DurationSource>, fallback_secs: f64) -> Self {
        Self {
            source,
            fallback_secs,
        }
    }

    /// Fallback duration in seconds.
    pub fn fallback_secs(&self) -> f64 {
        self.fallback_secs
    }

    /// Probe `path`, logging a warning and returning the fallback when the clip is absent or
    /// unreadable.
    ///
    /// Fails only when the probe tool itself produced no exit status (it could not be spawned, or
    /// was killed on timeout): that says nothing about the clip.
    pub fn probe(&self, path: &Path) -> ReelResult<ProbedDuration> {
        if !path.is_file() {
            tracing::warn!(
                path = %path.display(),
                fallback_secs = self.fallback_secs,
                "narration clip missing; using fallback duration"
            );
            return Ok(self.fallback(FallbackReason::Missing));
        }
        match self.source.duration_secs(path) {
            Ok(secs) if secs.is_finite() && secs > 0.0 => Ok(ProbedDuration {
                secs,
                fallback: None,
            }),
            Ok(secs) => {
                tracing::warn!(
                    path = %path.display(),
                    secs,
                    fallback_secs = self.fallback_secs,
                    "narration clip reported an unusable duration; using fallback duration"
                );
                Ok(self.fallback(FallbackReason::Unreadable))
            }
            Err(ReelError::ExternalTool(f)) if f.exit_code.is_none() => {
                Err(ReelError::ExternalTool(f))
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    fallback_secs = self.fallback_secs,
                    "narration clip unreadable; using fallback duration"
                );
                Ok(self.fallback(FallbackReason::Unreadable))
            }
        }
    }

    fn fallback(&self, reason: FallbackReason) -> ProbedDuration {
        ProbedDuration {
            secs: self.fallback_secs,
            fallback: Some(reason),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/probe.rs"]
mod tests;
