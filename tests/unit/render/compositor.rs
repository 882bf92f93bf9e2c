use super::*;

use std::cell::RefCell;
use std::rc::Rc;

use crate::text::TextMeasure;

/// Draws every line as a solid block `0.5 * font_size` wide per character.
#[derive(Clone, Default)]
struct BlockText {
    drawn: Rc<RefCell<Vec<TextLayout>>>,
}

impl TextMeasure for BlockText {
    fn measure(&mut self, text: &str, font_size_px: f32) -> ReelResult<f32> {
        Ok(text.chars().count() as f32 * font_size_px * 0.5)
    }
}

impl TextRasterizer for BlockText {
    fn draw(&mut self, frame: &mut FrameRGBA, layout: &TextLayout, rgba: [u8; 4]) -> ReelResult<()> {
        for line in &layout.lines {
            let x0 = line.x_px.max(0.0) as u32;
            let x1 = ((line.x_px + line.width_px).max(0.0) as u32).min(frame.width);
            let y0 = line.y_px.max(0.0) as u32;
            let y1 = ((line.y_px + layout.font_size_px) as u32).min(frame.height);
            for y in y0..y1 {
                for x in x0..x1 {
                    let i = ((y * frame.width + x) * 4) as usize;
                    frame.data[i..i + 4].copy_from_slice(&rgba);
                }
            }
        }
        self.drawn.borrow_mut().push(layout.clone());
        Ok(())
    }
}

const CANVAS: Canvas = Canvas {
    width: 200,
    height: 600,
};

fn style() -> OverlayStyle {
    OverlayStyle {
        band_height_px: 100,
        side_margin_px: 10,
        title_font_px: 20.0,
        title_text_top_px: 10,
        content_font_px: 10.0,
        content_band_bottom_margin_px: 50,
        content_text_inset_px: 10,
        ..OverlayStyle::default()
    }
}

fn compositor(title_style: TitleStyle) -> (FrameCompositor, BlockText) {
    let text = BlockText::default();
    let c = FrameCompositor::new(CANVAS, style(), title_style, Box::new(text.clone()));
    (c, text)
}

fn gray() -> FrameRGBA {
    FrameRGBA::solid(CANVAS, [200, 200, 200])
}

const DARK: Option<[u8; 4]> = Some([60, 60, 60, 255]);
const PLAIN: Option<[u8; 4]> = Some([200, 200, 200, 255]);
const WHITE: Option<[u8; 4]> = Some([255, 255, 255, 255]);

#[test]
fn bands_sit_at_top_and_above_bottom_margin() {
    let (c, _) = compositor(TitleStyle::Overlay);
    assert_eq!(c.title_band(), Band { top: 0, height: 100 });
    assert_eq!(c.content_band(), Band { top: 450, height: 100 });
}

#[test]
fn title_mode_darkens_top_band_and_centers_title() {
    let (mut c, text) = compositor(TitleStyle::Overlay);
    let f = c.compose_title(gray(), "Hello").unwrap();

    assert_eq!(f.pixel(0, 0), DARK);
    assert_eq!(f.pixel(0, 99), DARK);
    assert_eq!(f.pixel(0, 100), PLAIN);
    assert_eq!(f.pixel(0, 500), PLAIN);

    // "Hello" at 20px is 50px wide, centered on a 200px canvas, from y=10.
    assert_eq!(f.pixel(100, 15), WHITE);
    assert_eq!(f.pixel(74, 15), DARK);
    assert_eq!(f.pixel(125, 15), DARK);

    let drawn = text.drawn.borrow();
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0].lines[0].x_px, 75.0);
    assert_eq!(drawn[0].lines[0].y_px, 10.0);
    assert_eq!(drawn[0].line_height_px, 30.0);
}

#[test]
fn content_mode_darkens_bottom_band_only() {
    let (mut c, text) = compositor(TitleStyle::Overlay);
    let f = c.compose_content(gray(), "body").unwrap();

    assert_eq!(f.pixel(0, 449), PLAIN);
    assert_eq!(f.pixel(0, 450), DARK);
    assert_eq!(f.pixel(0, 549), DARK);
    assert_eq!(f.pixel(0, 550), PLAIN);
    assert_eq!(f.pixel(0, 0), PLAIN);

    let drawn = text.drawn.borrow();
    assert_eq!(drawn[0].start_y_px, 460.0);
    assert_eq!(drawn[0].font_size_px, 10.0);
}

#[test]
fn long_content_wraps_within_side_margins() {
    let (mut c, text) = compositor(TitleStyle::Overlay);
    let long = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod";
    c.compose_content(gray(), long).unwrap();

    let drawn = text.drawn.borrow();
    let lines = &drawn[0].lines;
    assert!(lines.len() > 1);
    assert!(lines.iter().all(|l| l.width_px <= 180.0));
    assert_eq!(
        lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join(" "),
        long
    );
    assert_eq!(lines[1].y_px - lines[0].y_px, 15.0);
}

#[test]
fn title_card_is_black_with_vertically_centered_title() {
    let (mut c, text) = compositor(TitleStyle::Card);
    let f = c.compose_title_card("Card").unwrap();

    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 255]));
    assert_eq!(f.pixel(0, 300), Some([0, 0, 0, 255]));
    let drawn = text.drawn.borrow();
    assert_eq!(drawn[0].lines.len(), 1);
    assert_eq!(drawn[0].lines[0].y_px, 260.0);
    assert_eq!(f.pixel(100, 265), WHITE);
}

#[test]
fn compose_section_dispatches_on_overlay_text() {
    let dir = tempfile::tempdir().unwrap();
    let img = dir.path().join("red.png");
    image::RgbaImage::from_pixel(10, 10, image::Rgba([200, 0, 0, 255]))
        .save(&img)
        .unwrap();

    let title = SectionSpec {
        index: 0,
        image: img.clone(),
        overlay_text: None,
        audio: dir.path().join("0_ana_baslik.mp3"),
    };
    let content = SectionSpec {
        index: 1,
        image: img,
        overlay_text: Some("x".to_string()),
        audio: dir.path().join("1_metin.mp3"),
    };

    let (mut c, _) = compositor(TitleStyle::Overlay);
    let f = c.compose_section(&title, "T").unwrap();
    assert_eq!(f.pixel(0, 0), Some([60, 0, 0, 255]));
    assert_eq!(f.pixel(0, 500), Some([200, 0, 0, 255]));

    let f = c.compose_section(&content, "T").unwrap();
    assert_eq!(f.pixel(0, 0), Some([200, 0, 0, 255]));
    assert_eq!(f.pixel(0, 500), Some([60, 0, 0, 255]));

    let (mut card, _) = compositor(TitleStyle::Card);
    let f = card.compose_section(&title, "T").unwrap();
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn compose_section_surfaces_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.png");
    std::fs::write(&bad, b"nope").unwrap();
    let section = SectionSpec {
        index: 1,
        image: bad,
        overlay_text: Some("x".to_string()),
        audio: dir.path().join("1_metin.mp3"),
    };
    let (mut c, _) = compositor(TitleStyle::Overlay);
    assert!(matches!(
        c.compose_section(&section, "T"),
        Err(ReelError::Render(_))
    ));
}

#[test]
fn base_frame_must_match_canvas() {
    let (mut c, _) = compositor(TitleStyle::Overlay);
    let small = FrameRGBA::solid(
        Canvas {
            width: 10,
            height: 10,
        },
        [0, 0, 0],
    );
    assert!(matches!(
        c.compose_title(small, "T"),
        Err(ReelError::Render(_))
    ));
}
