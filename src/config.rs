//! Per-run configuration.
//!
//! A [`ReelConfig`] is passed to [`crate::ReelGenerator`] at construction and never read from the
//! process environment. Every field has a default, so a partial JSON object deserializes into a
//! complete configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// How the title section is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleStyle {
    /// Title image with a darkened band across the top and the title inside it.
    #[default]
    Overlay,
    /// Plain black card with the title vertically centered.
    Card,
}

/// Geometry and colors of the text band overlays.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Band height in pixels.
    pub band_height_px: u32,
    /// Band opacity in `[0, 1]`.
    pub band_alpha: f32,
    /// Band RGB color.
    pub band_rgb: [u8; 3],
    /// Text color, straight-alpha RGBA8.
    pub text_rgba: [u8; 4],
    /// Horizontal margin on each side; the wrap budget is `canvas_width - 2 * side_margin_px`.
    pub side_margin_px: u32,
    /// Title font size.
    pub title_font_px: f32,
    /// Top of the first title line (overlay mode).
    pub title_text_top_px: u32,
    /// Content font size.
    pub content_font_px: f32,
    /// Distance between the content band's bottom edge and the canvas bottom.
    pub content_band_bottom_margin_px: u32,
    /// Offset of the first content line below the content band's top edge.
    pub content_text_inset_px: u32,
    /// Line pitch as a multiple of the font size.
    pub line_spacing: f32,
    /// Line pitch of the title card.
    pub card_line_height_px: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            band_height_px: 200,
            band_alpha: 0.7,
            band_rgb: [0, 0, 0],
            text_rgba: [255, 255, 255, 255],
            side_margin_px: 50,
            title_font_px: 60.0,
            title_text_top_px: 50,
            content_font_px: 40.0,
            content_band_bottom_margin_px: 50,
            content_text_inset_px: 20,
            line_spacing: 1.5,
            card_line_height_px: 80.0,
        }
    }
}

/// Explicit configuration of one generator.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Output width in pixels.
    pub canvas_width: u32,
    /// Output height in pixels.
    pub canvas_height: u32,
    /// Output frame rate (frames per second).
    pub fps: u32,
    /// Duration assigned to a section whose narration cannot be probed.
    pub fallback_duration_secs: f64,
    /// Working directory for temporary artifacts and the final video.
    pub output_dir: PathBuf,
    /// Narration directory name under `output_dir`, used when a request names none.
    pub audio_dir_name: String,
    /// Number of content sections following the title section.
    pub content_sections: usize,
    /// TrueType/OpenType font file. Well-known system locations are searched when unset.
    pub font_path: Option<PathBuf>,
    /// Title section style.
    pub title_style: TitleStyle,
    /// Directory the final video is copied into after a successful run.
    pub publish_dir: Option<PathBuf>,
    /// Upper bound on every external tool wait; `None` waits indefinitely.
    pub tool_timeout_secs: Option<u64>,
    /// `ffmpeg` executable.
    pub ffmpeg_bin: PathBuf,
    /// `ffprobe` executable.
    pub ffprobe_bin: PathBuf,
    /// Sample rate of synthesized silent clips; matches typical TTS MP3 output.
    pub silence_sample_rate: u32,
    /// Band and text geometry.
    pub style: OverlayStyle,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1080,
            canvas_height: 1920,
            fps: 30,
            fallback_duration_secs: 5.0,
            output_dir: PathBuf::from("output"),
            audio_dir_name: "sesler".to_string(),
            content_sections: 4,
            font_path: None,
            title_style: TitleStyle::Overlay,
            publish_dir: None,
            tool_timeout_secs: Some(600),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
            silence_sample_rate: 44_100,
            style: OverlayStyle::default(),
        }
    }
}

impl ReelConfig {
    /// Check the configuration for values the pipeline cannot honor.
    pub fn validate(&self) -> ReelResult<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if !self.canvas_width.is_multiple_of(2) || !self.canvas_height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        if self.canvas_width > u32::from(u16::MAX) || self.canvas_height > u32::from(u16::MAX) {
            return Err(ReelError::validation("canvas width/height must fit in u16"));
        }
        Fps::new(self.fps, 1)?;
        if !self.fallback_duration_secs.is_finite() || self.fallback_duration_secs <= 0.0 {
            return Err(ReelError::validation(
                "fallback_duration_secs must be finite and > 0",
            ));
        }
        if self.content_sections == 0 {
            return Err(ReelError::validation("content_sections must be >= 1"));
        }
        if self.audio_dir_name.trim().is_empty() {
            return Err(ReelError::validation("audio_dir_name must be non-empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ReelError::validation("output_dir must be non-empty"));
        }
        if self.silence_sample_rate == 0 {
            return Err(ReelError::validation("silence_sample_rate must be non-zero"));
        }
        if self.tool_timeout_secs == Some(0) {
            return Err(ReelError::validation(
                "tool_timeout_secs must be > 0 (use null to disable)",
            ));
        }

        let s = &self.style;
        if !(0.0..=1.0).contains(&s.band_alpha) {
            return Err(ReelError::validation("style.band_alpha must be within [0, 1]"));
        }
        for (name, v) in [
            ("style.title_font_px", s.title_font_px),
            ("style.content_font_px", s.content_font_px),
            ("style.line_spacing", s.line_spacing),
            ("style.card_line_height_px", s.card_line_height_px),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ReelError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if s.side_margin_px.saturating_mul(2) >= self.canvas_width {
            return Err(ReelError::validation(
                "style.side_margin_px leaves no room for text",
            ));
        }
        if s.band_height_px + s.content_band_bottom_margin_px > self.canvas_height {
            return Err(ReelError::validation(
                "content band does not fit inside the canvas",
            ));
        }
        Ok(())
    }

    /// Canvas geometry.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.canvas_width,
            height: self.canvas_height,
        }
    }

    /// Output frame rate.
    pub fn frame_rate(&self) -> ReelResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// External tool wait bound.
    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }

    /// Default narration directory for requests that name none.
    pub fn default_audio_dir(&self) -> PathBuf {
        self.output_dir.join(&self.audio_dir_name)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
