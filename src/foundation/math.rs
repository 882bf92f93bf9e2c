pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Linear mix `over * alpha + under * (1 - alpha)` of one 8-bit channel, rounded to nearest.
pub(crate) fn lerp_channel(under: u8, over: u8, alpha: f32) -> u8 {
    let a = alpha.clamp(0.0, 1.0);
    let v = f32::from(over) * a + f32::from(under) * (1.0 - a);
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
