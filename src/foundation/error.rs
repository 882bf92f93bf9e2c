use crate::pipeline::stage::GenerationStage;

/// Convenience result type used across reelforge.
pub type ReelResult<T> = Result<T, ReelError>;

/// Result type returned by external media tool invocations.
pub type ToolResult<T> = Result<T, ToolFailure>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid request, configuration or environment data. Raised before any artifact exists.
    #[error("input validation error: {0}")]
    Validation(String),

    /// The silent video stream could not be created.
    #[error("stream open error: {0}")]
    StreamOpen(String),

    /// Image decoding or frame composition failed.
    #[error("render error: {0}")]
    Render(String),

    /// An external media tool failed, could not be spawned, or timed out.
    #[error("external tool error: {0}")]
    ExternalTool(#[from] ToolFailure),

    /// A fatal error annotated with the pipeline stage it occurred in.
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// Stage that was active when the run failed.
        stage: GenerationStage,
        /// Underlying cause.
        source: Box<ReelError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::StreamOpen`] value.
    pub fn stream_open(msg: impl Into<String>) -> Self {
        Self::StreamOpen(msg.into())
    }

    /// Build a [`ReelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Wrap `self` with the stage it happened in. Already-wrapped errors are returned unchanged.
    pub fn in_stage(self, stage: GenerationStage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage recorded by [`ReelError::in_stage`], if any.
    pub fn stage(&self) -> Option<GenerationStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error, skipping the stage annotation.
    pub fn cause(&self) -> &ReelError {
        match self {
            Self::Stage { source, .. } => source.cause(),
            other => other,
        }
    }

    /// The external tool failure behind this error, if any.
    pub fn tool_failure(&self) -> Option<&ToolFailure> {
        match self.cause() {
            Self::ExternalTool(f) => Some(f),
            _ => None,
        }
    }
}

/// External tool invocation kinds, used to tell the caller which subprocess failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolStage {
    /// Raw frame encoding into the silent video stream.
    EncodeFrames,
    /// Lossless concatenation of narration clips.
    ConcatAudio,
    /// Muxing silent video and combined audio.
    Mux,
    /// Synthesis of a silent substitute clip.
    Silence,
    /// Container metadata probe.
    Probe,
}

impl std::fmt::Display for ToolStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::EncodeFrames => "frame encode",
            Self::ConcatAudio => "audio concat",
            Self::Mux => "mux",
            Self::Silence => "silence synthesis",
            Self::Probe => "probe",
        })
    }
}

/// Structured failure of one external tool invocation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage} failed ({}): {diagnostics}", exit_label(.exit_code))]
pub struct ToolFailure {
    /// Which invocation failed.
    pub stage: ToolStage,
    /// Process exit code; `None` when the process could not be spawned, was killed, or timed out.
    pub exit_code: Option<i32>,
    /// Captured stderr or a description of the failure.
    pub diagnostics: String,
}

impl ToolFailure {
    /// Build a failure for `stage`.
    pub fn new(stage: ToolStage, exit_code: Option<i32>, diagnostics: impl Into<String>) -> Self {
        Self {
            stage,
            exit_code,
            diagnostics: diagnostics.into(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code".to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
