use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u8;

/// An opaque frame as RGBA8 pixels, tightly packed, row-major.
///
/// Alpha is always 255, so the bytes are valid as both straight and premultiplied RGBA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// A frame filled with one opaque color.
    pub fn solid(canvas: Canvas, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(canvas.rgba_len());
        for _ in 0..(canvas.width as usize) * (canvas.height as usize) {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    /// Canvas this frame covers.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// RGBA value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Encode the frame as PNG at `path`.
    pub fn save_png(&self, path: &Path) -> ReelResult<()> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| ReelError::render("frame buffer does not match its dimensions"))?;
        img.save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Decode the image at `path` and stretch it to `canvas` without letterboxing.
///
/// Transparent regions are flattened over black.
pub fn load_stretched(path: &Path, canvas: Canvas) -> ReelResult<FrameRGBA> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let dyn_img = image::load_from_memory(&bytes).map_err(|e| {
        ReelError::render(format!("failed to decode image '{}': {e}", path.display()))
    })?;
    Ok(stretch_to_canvas(&dyn_img, canvas))
}

/// Stretch an already decoded image to `canvas`.
pub fn stretch_to_canvas(img: &image::DynamicImage, canvas: Canvas) -> FrameRGBA {
    let rgba = img.to_rgba8();
    let resized = if rgba.dimensions() == (canvas.width, canvas.height) {
        rgba
    } else {
        image::imageops::resize(
            &rgba,
            canvas.width,
            canvas.height,
            image::imageops::FilterType::Triangle,
        )
    };

    let mut data = resized.into_raw();
    flatten_over_black_in_place(&mut data);
    FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data,
    }
}

fn flatten_over_black_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
        px[3] = 255;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
