use super::*;

use crate::foundation::core::Canvas;

fn gray(width: u32, height: u32, v: u8) -> FrameRGBA {
    FrameRGBA::solid(Canvas { width, height }, [v, v, v])
}

#[test]
fn band_row_bounds_are_half_open() {
    let b = Band { top: 10, height: 5 };
    assert_eq!(b.bottom(), 15);
    assert!(b.contains_row(10));
    assert!(b.contains_row(14));
    assert!(!b.contains_row(15));
    assert!(!b.contains_row(9));
}

#[test]
fn blend_band_darkens_only_band_rows() {
    let mut f = gray(4, 10, 200);
    blend_band(&mut f, Band { top: 2, height: 3 }, [0, 0, 0], 0.7);
    for y in 0..10 {
        let expected = if (2..5).contains(&y) { 60 } else { 200 };
        assert_eq!(f.pixel(0, y), Some([expected, expected, expected, 255]), "row {y}");
        assert_eq!(f.pixel(3, y), f.pixel(0, y));
    }
}

#[test]
fn blend_band_clips_to_frame_and_ignores_zero_alpha() {
    let mut f = gray(2, 4, 100);
    blend_band(&mut f, Band { top: 3, height: 50 }, [0, 0, 0], 1.0);
    assert_eq!(f.pixel(0, 2), Some([100, 100, 100, 255]));
    assert_eq!(f.pixel(0, 3), Some([0, 0, 0, 255]));

    let before = f.clone();
    blend_band(&mut f, Band { top: 0, height: 4 }, [255, 0, 0], 0.0);
    assert_eq!(f, before);
}

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_half_covered_glyph_edge_mixes_with_background() {
    // Premultiplied white at 50% coverage over opaque black.
    let out = over([0, 0, 0, 255], [128, 128, 128, 128], 1.0);
    assert_eq!(out, [128, 128, 128, 255]);
}

#[test]
fn over_in_place_requires_matching_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());

    let src = [0, 0, 0, 0, 255, 255, 255, 255];
    over_in_place(&mut dst, &src, 1.0).unwrap();
    assert_eq!(dst, vec![0, 0, 0, 0, 255, 255, 255, 255]);
}
