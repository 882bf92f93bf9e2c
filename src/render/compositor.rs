use crate::config::{OverlayStyle, TitleStyle};
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::composite::{Band, blend_band};
use crate::render::frame::{FrameRGBA, load_stretched};
use crate::request::SectionSpec;
use crate::text::TextRasterizer;
use crate::text::layout::{LayoutParams, TextLayout, layout_text, wrap_words};

/// Builds the still frame of each section: stretched background, darkened band, wrapped text.
///
/// Frames depend only on (image, text, mode); the compositor knows nothing about timing.
pub struct FrameCompositor {
    canvas: Canvas,
    style: OverlayStyle,
    title_style: TitleStyle,
    text: Box<dyn TextRasterizer>,
}

impl FrameCompositor {
    /// Create a compositor drawing text with `text`.
    pub fn new(
        canvas: Canvas,
        style: OverlayStyle,
        title_style: TitleStyle,
        text: Box<dyn TextRasterizer>,
    ) -> Self {
        Self {
            canvas,
            style,
            title_style,
            text,
        }
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Band darkened behind the title (top of the frame).
    pub fn title_band(&self) -> Band {
        Band {
            top: 0,
            height: self.style.band_height_px,
        }
    }

    /// Band darkened behind content text (near the bottom of the frame).
    pub fn content_band(&self) -> Band {
        let bottom = self
            .canvas
            .height
            .saturating_sub(self.style.content_band_bottom_margin_px);
        Band {
            top: bottom.saturating_sub(self.style.band_height_px),
            height: self.style.band_height_px,
        }
    }

    fn wrap_budget_px(&self) -> f32 {
        self.canvas
            .width
            .saturating_sub(self.style.side_margin_px.saturating_mul(2)) as f32
    }

    /// Compose the frame for `section`; the title section draws `title`.
    pub fn compose_section(&mut self, section: &SectionSpec, title: &str) -> ReelResult<FrameRGBA> {
        match (&section.overlay_text, self.title_style) {
            (None, TitleStyle::Card) => self.compose_title_card(title),
            (None, TitleStyle::Overlay) => {
                let base = load_stretched(&section.image, self.canvas)?;
                self.compose_title(base, title)
            }
            (Some(text), _) => {
                let base = load_stretched(&section.image, self.canvas)?;
                self.compose_content(base, text)
            }
        }
    }

    /// Title mode: darken the top band and draw `title` in the large font from the band's top.
    pub fn compose_title(&mut self, base: FrameRGBA, title: &str) -> ReelResult<FrameRGBA> {
        let layout = self.layout(
            title,
            self.style.title_font_px,
            self.style.title_text_top_px as f32,
        )?;
        self.overlay(base, self.title_band(), &layout)
    }

    /// Content mode: darken the bottom band and draw `text` in the small font inside it.
    pub fn compose_content(&mut self, base: FrameRGBA, text: &str) -> ReelResult<FrameRGBA> {
        let band = self.content_band();
        let layout = self.layout(
            text,
            self.style.content_font_px,
            (band.top + self.style.content_text_inset_px) as f32,
        )?;
        self.overlay(base, band, &layout)
    }

    /// Title card: black frame with `title` centered vertically on a fixed line pitch.
    pub fn compose_title_card(&mut self, title: &str) -> ReelResult<FrameRGBA> {
        let font_size_px = self.style.title_font_px;
        let pitch = self.style.card_line_height_px;
        let max_width_px = self.wrap_budget_px();
        let lines = wrap_words(self.text.as_mut(), title, max_width_px, font_size_px)?;
        let block = (lines.len() as f32) * pitch;
        let start_y_px = ((self.canvas.height as f32 - block) / 2.0).floor();
        let layout = TextLayout::from_lines(
            lines,
            LayoutParams {
                max_width_px,
                font_size_px,
                line_height_px: pitch,
                canvas_width: self.canvas.width,
                start_y_px,
            },
        );

        let mut frame = FrameRGBA::solid(self.canvas, [0, 0, 0]);
        self.text.draw(&mut frame, &layout, self.style.text_rgba)?;
        Ok(frame)
    }

    fn layout(&mut self, text: &str, font_size_px: f32, start_y_px: f32) -> ReelResult<TextLayout> {
        let params = LayoutParams {
            max_width_px: self.wrap_budget_px(),
            font_size_px,
            line_height_px: font_size_px * self.style.line_spacing,
            canvas_width: self.canvas.width,
            start_y_px,
        };
        layout_text(self.text.as_mut(), text, params)
    }

    fn overlay(
        &mut self,
        mut frame: FrameRGBA,
        band: Band,
        layout: &TextLayout,
    ) -> ReelResult<FrameRGBA> {
        if frame.canvas() != self.canvas {
            return Err(ReelError::render(format!(
                "base frame is {}x{}, expected {}x{}",
                frame.width, frame.height, self.canvas.width, self.canvas.height
            )));
        }
        blend_band(&mut frame, band, self.style.band_rgb, self.style.band_alpha);
        self.text.draw(&mut frame, layout, self.style.text_rgba)?;
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
