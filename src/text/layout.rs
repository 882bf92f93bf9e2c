use crate::foundation::error::{ReelError, ReelResult};
use crate::text::TextMeasure;

/// Placement inputs for [`layout_text`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Wrap budget in pixels.
    pub max_width_px: f32,
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Vertical pitch between line tops.
    pub line_height_px: f32,
    /// Canvas width used for horizontal centering.
    pub canvas_width: u32,
    /// Top of the first line.
    pub start_y_px: f32,
}

/// One placed line.
#[derive(Clone, Debug, PartialEq)]
pub struct LaidOutLine {
    /// Line text.
    pub text: String,
    /// Measured width.
    pub width_px: f32,
    /// Left edge; centers the line on the canvas.
    pub x_px: f32,
    /// Top edge.
    pub y_px: f32,
}

/// Wrapped, placed text block. Built per section and never cached.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout {
    /// Lines top-down.
    pub lines: Vec<LaidOutLine>,
    /// Font size the lines were measured at.
    pub font_size_px: f32,
    /// Vertical pitch between line tops.
    pub line_height_px: f32,
    /// Top of the first line.
    pub start_y_px: f32,
}

impl TextLayout {
    /// Place pre-wrapped `(text, width)` lines.
    pub fn from_lines(lines: Vec<(String, f32)>, params: LayoutParams) -> Self {
        let canvas_w = params.canvas_width as f32;
        let lines = lines
            .into_iter()
            .enumerate()
            .map(|(i, (text, width_px))| LaidOutLine {
                text,
                width_px,
                x_px: (canvas_w - width_px) / 2.0,
                y_px: params.start_y_px + (i as f32) * params.line_height_px,
            })
            .collect();
        Self {
            lines,
            font_size_px: params.font_size_px,
            line_height_px: params.line_height_px,
            start_y_px: params.start_y_px,
        }
    }
}

/// Greedy word wrap of `text` into lines no wider than `max_width_px`.
///
/// Words are separated by any whitespace. A word that alone exceeds the budget is kept whole on its
/// own line. The last line is always emitted, so empty input yields a single empty line. Returns
/// each line with its measured width.
pub fn wrap_words<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    max_width_px: f32,
    font_size_px: f32,
) -> ReelResult<Vec<(String, f32)>> {
    if !max_width_px.is_finite() || max_width_px <= 0.0 {
        return Err(ReelError::validation("max_width_px must be finite and > 0"));
    }
    if !font_size_px.is_finite() || font_size_px <= 0.0 {
        return Err(ReelError::validation("font_size_px must be finite and > 0"));
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0f32;

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        let w = measure.measure(&candidate, font_size_px)?;
        if w > max_width_px && !current.is_empty() {
            lines.push((std::mem::take(&mut current), current_w));
            current_w = measure.measure(word, font_size_px)?;
            current = word.to_string();
        } else {
            current = candidate;
            current_w = w;
        }
    }
    lines.push((current, current_w));
    Ok(lines)
}

/// Wrap `text` and center each line horizontally, stacking lines from `params.start_y_px`.
pub fn layout_text<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    params: LayoutParams,
) -> ReelResult<TextLayout> {
    let lines = wrap_words(measure, text, params.max_width_px, params.font_size_px)?;
    Ok(TextLayout::from_lines(lines, params))
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
