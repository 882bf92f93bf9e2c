use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{lerp_channel, mul_div255_u8};
use crate::render::frame::FrameRGBA;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Full-width horizontal band `[top, top + height)` in frame rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    /// First row.
    pub top: u32,
    /// Number of rows.
    pub height: u32,
}

impl Band {
    /// One past the last row.
    pub fn bottom(self) -> u32 {
        self.top.saturating_add(self.height)
    }

    /// `true` when row `y` is inside the band.
    pub fn contains_row(self, y: u32) -> bool {
        self.top <= y && y < self.bottom()
    }
}

/// Blend `rgb` over the band rows of `frame`: `rgb * alpha + pixel * (1 - alpha)` per channel.
///
/// Rows outside the band, and the alpha channel, are left untouched. The band is clipped to the
/// frame.
pub fn blend_band(frame: &mut FrameRGBA, band: Band, rgb: [u8; 3], alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let top = band.top.min(frame.height) as usize;
    let bottom = band.bottom().min(frame.height) as usize;
    let stride = (frame.width as usize) * 4;

    for px in frame.data[top * stride..bottom * stride].chunks_exact_mut(4) {
        px[0] = lerp_channel(px[0], rgb[0], alpha);
        px[1] = lerp_channel(px[1], rgb[1], alpha);
        px[2] = lerp_channel(px[2], rgb[2], alpha);
    }
}

/// Premultiplied source-over of one pixel, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Composite a premultiplied RGBA8 layer of the same size over `dst`.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> ReelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
