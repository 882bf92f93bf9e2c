use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::audio::probe::{AudioDurationProbe, DurationSource, FallbackReason, FfprobeDuration};
use crate::config::ReelConfig;
use crate::encode::ffmpeg::{FfmpegToolchain, FfmpegToolchainOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::encode::toolchain::MediaToolchain;
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::pipeline::artifacts::Artifacts;
use crate::pipeline::concat::{AudioConcatenator, ClipSource};
use crate::pipeline::mux::AvMuxer;
use crate::pipeline::stage::GenerationStage;
use crate::pipeline::writer::{SectionFrameWriter, frame_count_for};
use crate::render::compositor::FrameCompositor;
use crate::render::frame::FrameRGBA;
use crate::request::{GenerationRequest, SectionSpec};
use crate::text::TextRasterizer;
use crate::text::font::{FontRasterizer, resolve_font};

/// Timing decided for one section before any frame is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionPlan {
    /// The section itself.
    pub section: SectionSpec,
    /// Narration length, or the fallback.
    pub duration_secs: f64,
    /// Number of identical frames emitted for the section.
    pub frame_count: u64,
    /// Set when the narration clip was missing or unreadable and the fallback duration was used.
    pub fallback: Option<FallbackReason>,
}

impl SectionPlan {
    /// `true` when the fallback duration was used.
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Audio placed in this section's slot of the concat manifest.
    ///
    /// Only a missing clip is replaced by silence; an existing clip is always kept, even when its
    /// duration could not be read.
    pub fn clip_source(&self) -> ClipSource {
        match self.fallback {
            Some(FallbackReason::Missing) => ClipSource::Silence {
                index: self.section.index,
                secs: self.duration_secs,
            },
            _ => ClipSource::File(self.section.audio.clone()),
        }
    }
}

/// Summary of a successful run.
#[derive(Clone, Debug)]
pub struct GenerationReport {
    /// Muxed output in the output directory.
    pub final_video: PathBuf,
    /// Copy in the publish directory, when one is configured.
    pub published_video: Option<PathBuf>,
    /// Per-section timing, in output order.
    pub sections: Vec<SectionPlan>,
    /// Frames written to the video stream.
    pub total_frames: u64,
    /// Stages visited, ending with [`GenerationStage::Done`].
    pub stages: Vec<GenerationStage>,
}

impl GenerationReport {
    /// Sections that used the fallback duration.
    pub fn fallback_sections(&self) -> impl Iterator<Item = &SectionPlan> {
        self.sections.iter().filter(|s| s.is_fallback())
    }
}

/// Validated inputs of one run.
struct Prepared {
    name: String,
    fps: Fps,
    sections: Vec<SectionSpec>,
}

/// Tracks the active stage so a failure can be attributed to it.
#[derive(Default)]
struct StageLog {
    visited: Vec<GenerationStage>,
}

impl StageLog {
    fn enter(&mut self, stage: GenerationStage) {
        tracing::info!(%stage, "entering stage");
        self.visited.push(stage);
    }

    fn current(&self) -> GenerationStage {
        self.visited
            .last()
            .copied()
            .unwrap_or(GenerationStage::Validating)
    }
}

/// Drives one reel from request to final file.
///
/// Sections are handled strictly in order: probe, compose, then write. Audio concatenation starts
/// only after the video stream is closed, and muxing only after concatenation succeeds. Temporary
/// artifacts are removed on every exit path.
pub struct ReelGenerator {
    config: ReelConfig,
    toolchain: Box<dyn MediaToolchain>,
    durations: AudioDurationProbe,
    compositor: Option<FrameCompositor>,
}

impl ReelGenerator {
    /// Generator backed by the system `ffmpeg`/`ffprobe`. The font is resolved on first use.
    pub fn new(config: ReelConfig) -> ReelResult<Self> {
        let timeout = config.tool_timeout();
        let toolchain = FfmpegToolchain::new(FfmpegToolchainOpts {
            ffmpeg_bin: config.ffmpeg_bin.clone(),
            timeout,
            silence_sample_rate: config.silence_sample_rate,
        });
        let durations = FfprobeDuration::new(config.ffprobe_bin.clone(), timeout);
        Self::with_parts(config, Box::new(toolchain), Box::new(durations))
    }

    /// Generator with explicit media collaborators.
    pub fn with_parts(
        config: ReelConfig,
        toolchain: Box<dyn MediaToolchain>,
        durations: Box<dyn DurationSource>,
    ) -> ReelResult<Self> {
        config.validate()?;
        let durations = AudioDurationProbe::new(durations, config.fallback_duration_secs);
        Ok(Self {
            config,
            toolchain,
            durations,
            compositor: None,
        })
    }

    /// Draw text with `text` instead of the configured font.
    pub fn with_text_rasterizer(mut self, text: Box<dyn TextRasterizer>) -> Self {
        self.compositor = Some(self.build_compositor(text));
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    fn build_compositor(&self, text: Box<dyn TextRasterizer>) -> FrameCompositor {
        FrameCompositor::new(
            self.config.canvas(),
            self.config.style.clone(),
            self.config.title_style,
            text,
        )
    }

    fn ensure_compositor(&mut self) -> ReelResult<()> {
        if self.compositor.is_none() {
            let font = resolve_font(self.config.font_path.as_deref())?;
            let text = FontRasterizer::new(&font)?;
            tracing::info!(
                font = %font.path.display(),
                family = text.family_name(),
                "using overlay font"
            );
            self.compositor = Some(self.build_compositor(Box::new(text)));
        }
        Ok(())
    }

    fn prepare(&self, request: &GenerationRequest) -> ReelResult<Prepared> {
        self.config.validate()?;
        request.validate(self.config.content_sections)?;
        let audio_dir = request.validate_audio_dir(&self.config.default_audio_dir())?;
        Ok(Prepared {
            name: request.output_name(),
            fps: self.config.frame_rate()?,
            sections: request.sections(&audio_dir),
        })
    }

    fn plan_section(&self, section: SectionSpec, fps: Fps) -> ReelResult<SectionPlan> {
        let probed = self.durations.probe(&section.audio)?;
        Ok(SectionPlan {
            frame_count: frame_count_for(probed.secs, fps),
            duration_secs: probed.secs,
            fallback: probed.fallback,
            section,
        })
    }

    /// Validate `request` and probe every narration clip without rendering anything.
    pub fn plan(&self, request: &GenerationRequest) -> ReelResult<Vec<SectionPlan>> {
        let prepared = self
            .prepare(request)
            .map_err(|e| e.in_stage(GenerationStage::Validating))?;
        prepared
            .sections
            .into_iter()
            .map(|s| self.plan_section(s, prepared.fps))
            .collect()
    }

    /// Compose the still frame of section `index` (0 = title) without writing any video.
    pub fn preview_frame(
        &mut self,
        request: &GenerationRequest,
        index: usize,
    ) -> ReelResult<FrameRGBA> {
        request.validate(self.config.content_sections)?;
        let audio_dir = request
            .audio_dir
            .clone()
            .unwrap_or_else(|| self.config.default_audio_dir());
        let section = request
            .sections(&audio_dir)
            .into_iter()
            .nth(index)
            .ok_or_else(|| {
                ReelError::validation(format!(
                    "section {index} out of range (0..={})",
                    self.config.content_sections
                ))
            })?;
        self.ensure_compositor()?;
        let compositor = self
            .compositor
            .as_mut()
            .ok_or_else(|| ReelError::render("compositor unavailable"))?;
        compositor.compose_section(&section, &request.title)
    }

    /// Produce the reel for `request`.
    ///
    /// On failure the error carries the stage that was active (see [`ReelError::stage`]) and no
    /// temporary artifact is left behind.
    #[tracing::instrument(skip(self, request), fields(title = %request.title))]
    pub fn generate(&mut self, request: &GenerationRequest) -> ReelResult<GenerationReport> {
        let mut stages = StageLog::default();
        stages.enter(GenerationStage::Validating);
        let prepared = self
            .prepare(request)
            .and_then(|p| self.ensure_compositor().map(|()| p))
            .map_err(|e| e.in_stage(GenerationStage::Validating))?;

        let mut artifacts = Artifacts::new(&self.config.output_dir, &prepared.name);
        let produced = self.produce(request, &prepared, &mut artifacts, &mut stages);
        let (sections, total_frames) = match produced {
            Ok(out) => out,
            Err(e) => {
                let stage = stages.current();
                if stage == GenerationStage::Muxing {
                    artifacts.discard_final();
                }
                artifacts.cleanup_temps();
                tracing::error!(%stage, error = %e, "generation failed");
                return Err(e.in_stage(stage));
            }
        };

        stages.enter(GenerationStage::Cleaning);
        let leftover = artifacts.cleanup_temps();
        if leftover > 0 {
            tracing::warn!(leftover, "some temporary artifacts could not be removed");
        }

        let published_video = match &self.config.publish_dir {
            Some(dir) => {
                stages.enter(GenerationStage::Publishing);
                Some(
                    publish(&artifacts.final_video, dir)
                        .map_err(|e| e.in_stage(GenerationStage::Publishing))?,
                )
            }
            None => None,
        };

        stages.enter(GenerationStage::Done);
        tracing::info!(
            output = %artifacts.final_video.display(),
            total_frames,
            "reel generated"
        );
        Ok(GenerationReport {
            final_video: artifacts.final_video,
            published_video,
            sections,
            total_frames,
            stages: stages.visited,
        })
    }

    fn produce(
        &mut self,
        request: &GenerationRequest,
        prepared: &Prepared,
        artifacts: &mut Artifacts,
        stages: &mut StageLog,
    ) -> ReelResult<(Vec<SectionPlan>, u64)> {
        stages.enter(GenerationStage::WritingFrames);
        std::fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!(
                "create output dir '{}'",
                self.config.output_dir.display()
            )
        })?;

        let canvas = self.config.canvas();
        let mut sink = self.toolchain.open_video_stream(
            &artifacts.temp_video,
            SinkConfig {
                width: canvas.width,
                height: canvas.height,
                fps: prepared.fps,
            },
        )?;

        let written = self.write_sections(sink.as_mut(), request, prepared);
        let (plans, total_frames) = match written {
            Ok(out) => out,
            Err(e) => {
                sink.abort();
                return Err(e);
            }
        };
        sink.end()?;
        drop(sink);

        stages.enter(GenerationStage::ConcatenatingAudio);
        let clips: Vec<ClipSource> = plans.iter().map(SectionPlan::clip_source).collect();
        let audio = AudioConcatenator::new(self.toolchain.as_ref()).concatenate(&clips, artifacts)?;

        stages.enter(GenerationStage::Muxing);
        AvMuxer::new(self.toolchain.as_ref()).mux(
            &artifacts.temp_video,
            &audio,
            &artifacts.final_video,
        )?;

        Ok((plans, total_frames))
    }

    fn write_sections(
        &mut self,
        sink: &mut dyn FrameSink,
        request: &GenerationRequest,
        prepared: &Prepared,
    ) -> ReelResult<(Vec<SectionPlan>, u64)> {
        let mut writer = SectionFrameWriter::new(sink);
        let mut plans = Vec::with_capacity(prepared.sections.len());
        for section in &prepared.sections {
            let plan = self.plan_section(section.clone(), prepared.fps)?;
            let compositor = self
                .compositor
                .as_mut()
                .ok_or_else(|| ReelError::render("compositor unavailable"))?;
            let frame = compositor.compose_section(&plan.section, &request.title)?;
            writer.write_section(&frame, plan.frame_count)?;
            tracing::debug!(
                section = plan.section.index,
                duration_secs = plan.duration_secs,
                frames = plan.frame_count,
                fallback = ?plan.fallback,
                "section written"
            );
            plans.push(plan);
        }
        Ok((plans, writer.frames_written()))
    }
}

/// Copy `final_video` into `dir`, keeping its file name.
fn publish(final_video: &Path, dir: &Path) -> ReelResult<PathBuf> {
    let file_name = final_video
        .file_name()
        .ok_or_else(|| ReelError::validation("final video has no file name"))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create publish dir '{}'", dir.display()))?;
    let dest = dir.join(file_name);
    let same_file = match (dest.canonicalize(), final_video.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !same_file {
        std::fs::copy(final_video, &dest).with_context(|| {
            format!(
                "copy '{}' to '{}'",
                final_video.display(),
                dest.display()
            )
        })?;
    }
    tracing::info!(path = %dest.display(), "published reel");
    Ok(dest)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
