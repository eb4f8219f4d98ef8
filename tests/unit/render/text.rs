use super::*;

use crate::render::style::{Insets, LineHeight};

fn test_font() -> Option<Vec<u8>> {
    let candidates = [
        std::env::var("FADETITLE_FONT").unwrap_or_default(),
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
        "/usr/share/fonts/TTF/DejaVuSans.ttf".to_string(),
        "/Library/Fonts/Arial.ttf".to_string(),
    ];
    candidates
        .iter()
        .filter(|p| !p.is_empty())
        .find_map(|p| std::fs::read(p).ok())
}

fn plain_style(width: BlockWidth) -> TextStyle {
    TextStyle {
        font_size_px: 40.0,
        fill: crate::render::color::ColorDef::rgba(0.0, 0.0, 0.0, 1.0),
        letter_spacing_px: 0.0,
        line_height: LineHeight::Relative(1.2),
        padding: Insets::uniform(10.0),
        shadow: None,
        stroke: None,
        width,
    }
}

#[test]
fn slot_offsets_skip_line_breaks() {
    let offsets = letter_slot_offsets("ab\ncé\r\nd");
    assert_eq!(offsets, vec![0, 1, 3, 4, 8]);
    assert_eq!(slot_for_byte(&offsets, 3), Some(2));
    assert_eq!(slot_for_byte(&offsets, 2), None);
    assert_eq!(slot_for_byte(&offsets, 5), None);
}

#[test]
fn empty_font_bytes_are_rejected() {
    assert!(TextLayoutEngine::new(&[]).is_err());
}

#[test]
fn shrink_to_fit_block_is_centered_with_padding() {
    let Some(font) = test_font() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&font).unwrap();
    assert!(!engine.family_name().is_empty());

    let block = engine
        .layout_block(
            "Hi there",
            &plain_style(BlockWidth::ShrinkToFit { max_px: 850.0 }),
            Canvas::VIEWPORT,
        )
        .unwrap();

    assert_eq!(block.letters.len(), 8);
    assert!(block.letters[0].glyphs.len() >= 1);
    assert!((block.bounds.width() - block.content.width() - 20.0).abs() < 1e-3);
    let center_x = (block.bounds.x0 + block.bounds.x1) / 2.0;
    let center_y = (block.bounds.y0 + block.bounds.y1) / 2.0;
    assert!((center_x - 960.0).abs() < 1.0);
    assert!((center_y - 540.0).abs() < 1.0);
    for g in block.letters.iter().flat_map(|l| l.glyphs.iter()) {
        assert!(f64::from(g.x) >= block.content.x0 - 1.0);
        assert!(f64::from(g.x) <= block.content.x1 + 1.0);
    }
}

#[test]
fn full_viewport_block_wraps_on_newline_and_keeps_slots() {
    let Some(font) = test_font() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&font).unwrap();
    let block = engine
        .layout_block(
            "AB\nCD",
            &plain_style(BlockWidth::FullViewport),
            Canvas::VIEWPORT,
        )
        .unwrap();

    assert_eq!(block.letters.len(), 4);
    assert_eq!(block.bounds.x0, 0.0);
    assert_eq!(block.bounds.x1, 1920.0);
    let y_a = block.letters[0].glyphs[0].y;
    let y_c = block.letters[2].glyphs[0].y;
    assert!(y_c > y_a);
}
