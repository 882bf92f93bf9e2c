//! Text measurement, wrapping and rasterization.

use crate::foundation::error::ReelResult;
use crate::render::frame::FrameRGBA;

/// Font-backed measurement and rasterization.
pub mod font;
/// Greedy word wrapping and line placement.
pub mod layout;

pub use layout::TextLayout;

/// Measures the rendered advance width of a single line of text.
pub trait TextMeasure {
    /// Width in pixels of `text` set on one line at `font_size_px`.
    fn measure(&mut self, text: &str, font_size_px: f32) -> ReelResult<f32>;
}

/// Draws laid-out text onto frames.
pub trait TextRasterizer: TextMeasure {
    /// Composite every line of `layout` onto `frame` in straight-alpha `rgba`.
    fn draw(&mut self, frame: &mut FrameRGBA, layout: &TextLayout, rgba: [u8; 4])
    -> ReelResult<()>;
}
