//! Reelforge turns a title, a set of still images, per-section texts and pre-recorded narration
//! clips into one vertical slideshow video.
//!
//! Each section is a single composed still held on screen for exactly as long as its narration:
//!
//! - Build a [`ReelConfig`] and a [`GenerationRequest`]
//! - Create a [`ReelGenerator`]
//! - Call [`ReelGenerator::generate`] to write `<output_dir>/<sanitized title>.mp4`
//!
//! External tools (`ffmpeg`, `ffprobe`) are reached only through [`MediaToolchain`] and
//! [`DurationSource`], so the whole pipeline can run against in-memory fakes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Narration clip probing.
pub mod audio;
/// Per-run configuration.
pub mod config;
/// Frame sinks and the media toolchain.
pub mod encode;
/// Generation pipeline and orchestrator.
pub mod pipeline;
/// Frame composition.
pub mod render;
/// Request model and naming rules.
pub mod request;
/// Text layout and rasterization.
pub mod text;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex};
pub use crate::foundation::error::{ReelError, ReelResult, ToolFailure, ToolResult, ToolStage};

pub use crate::audio::probe::{
    AudioDurationProbe, DurationSource, FallbackReason, FfprobeDuration, ProbedDuration,
};
pub use crate::config::{OverlayStyle, ReelConfig, TitleStyle};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, FfmpegToolchain, FfmpegToolchainOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::encode::toolchain::MediaToolchain;
pub use crate::pipeline::orchestrator::{GenerationReport, ReelGenerator, SectionPlan};
pub use crate::pipeline::stage::GenerationStage;
pub use crate::render::compositor::FrameCompositor;
pub use crate::render::frame::FrameRGBA;
pub use crate::request::{GenerationRequest, SectionSpec, SectionText, sanitize_title};
pub use crate::text::{TextMeasure, TextRasterizer};
