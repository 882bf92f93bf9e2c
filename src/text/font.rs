use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};
use crate::render::composite::over_in_place;
use crate::render::frame::FrameRGBA;
use crate::text::{TextLayout, TextMeasure, TextRasterizer};

/// Fonts tried, in order, when no font file is configured.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Font bytes and where they came from.
#[derive(Clone, Debug)]
pub struct FontFile {
    /// Source path.
    pub path: PathBuf,
    /// Raw TrueType/OpenType bytes.
    pub bytes: Vec<u8>,
}

/// Load `explicit`, or the first readable entry of [`SYSTEM_FONT_CANDIDATES`].
pub fn resolve_font(explicit: Option<&Path>) -> ReelResult<FontFile> {
    if let Some(path) = explicit {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font '{}'", path.display()))
            .map_err(|e| ReelError::validation(format!("font_path: {e:#}")))?;
        return Ok(FontFile {
            path: path.to_path_buf(),
            bytes,
        });
    }

    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .find_map(|p| {
            std::fs::read(p).ok().map(|bytes| FontFile {
                path: p.to_path_buf(),
                bytes,
            })
        })
        .ok_or_else(|| {
            ReelError::validation(
                "font_path: no font configured and no known system font found",
            )
        })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    /// Red channel.
    pub(crate) r: u8,
    /// Green channel.
    pub(crate) g: u8,
    /// Blue channel.
    pub(crate) b: u8,
    /// Alpha channel.
    pub(crate) a: u8,
}

/// Parley contexts bound to one registered font family.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `font_bytes` and build fresh Parley contexts around it.
    pub fn new(font_bytes: &[u8]) -> ReelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ReelError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    /// Family name of the registered font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` as a single unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextMeasure for TextLayoutEngine {
    fn measure(&mut self, text: &str, font_size_px: f32) -> ReelResult<f32> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let layout = self.layout_line(text, font_size_px, TextBrushRgba8::default())?;
        Ok(layout.width())
    }
}

/// [`TextRasterizer`] that shapes with Parley and fills glyphs with `vello_cpu`.
pub struct FontRasterizer {
    engine: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
    ctx: Option<vello_cpu::RenderContext>,
}

impl FontRasterizer {
    /// Build a rasterizer for `font`.
    pub fn new(font: &FontFile) -> ReelResult<Self> {
        let engine = TextLayoutEngine::new(&font.bytes)?;
        tracing::debug!(
            path = %font.path.display(),
            family = engine.family_name(),
            "registered overlay font"
        );
        Ok(Self {
            engine,
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font.bytes.clone()),
                0,
            ),
            ctx: None,
        })
    }

    /// Family name of the font in use.
    pub fn family_name(&self) -> &str {
        self.engine.family_name()
    }

    fn take_ctx(&mut self, width: u16, height: u16) -> vello_cpu::RenderContext {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx
    }
}

impl TextMeasure for FontRasterizer {
    fn measure(&mut self, text: &str, font_size_px: f32) -> ReelResult<f32> {
        self.engine.measure(text, font_size_px)
    }
}

impl TextRasterizer for FontRasterizer {
    fn draw(
        &mut self,
        frame: &mut FrameRGBA,
        layout: &TextLayout,
        rgba: [u8; 4],
    ) -> ReelResult<()> {
        if layout.lines.iter().all(|l| l.text.is_empty()) {
            return Ok(());
        }
        let width: u16 = frame
            .width
            .try_into()
            .map_err(|_| ReelError::render("frame width exceeds u16"))?;
        let height: u16 = frame
            .height
            .try_into()
            .map_err(|_| ReelError::render("frame height exceeds u16"))?;

        let brush = TextBrushRgba8 {
            r: rgba[0],
            g: rgba[1],
            b: rgba[2],
            a: rgba[3],
        };
        let mut ctx = self.take_ctx(width, height);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            brush.r, brush.g, brush.b, brush.a,
        ));

        for line in layout.lines.iter().filter(|l| !l.text.is_empty()) {
            let shaped = self
                .engine
                .layout_line(&line.text, layout.font_size_px, brush)?;
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                f64::from(line.x_px),
                f64::from(line.y_px),
            )));
            for shaped_line in shaped.lines() {
                for item in shaped_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&self.font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        over_in_place(&mut frame.data, pixmap.data_as_u8_slice(), 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
