use super::*;

fn test_font() -> Option<Vec<u8>> {
    [
        std::env::var("FADETITLE_FONT").unwrap_or_default(),
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
        "/usr/share/fonts/TTF/DejaVuSans.ttf".to_string(),
    ]
    .iter()
    .filter(|p| !p.is_empty())
    .find_map(|p| std::fs::read(p).ok())
}

fn alpha_sum(frame: &FrameRGBA) -> u64 {
    frame.data.chunks_exact(4).map(|p| u64::from(p[3])).sum()
}

#[test]
fn garbage_font_bytes_are_rejected() {
    assert!(CpuSurfaceFactory::from_bytes(vec![0u8; 16]).is_err());
    assert!(CpuSurfaceFactory::from_font_path(Path::new("/definitely/missing.ttf")).is_err());
}

#[test]
fn title_frames_follow_letter_opacity() {
    let Some(font) = test_font() else {
        return;
    };
    let factory = CpuSurfaceFactory::from_bytes(font).unwrap();
    let mut surface = factory.open("AB", &TextStyle::title()).unwrap();
    assert_eq!(surface.letters_count(), 2);
    assert_eq!(surface.canvas(), Canvas::VIEWPORT);

    let hidden = surface.render_frame(&[0.0, 0.0]).unwrap();
    assert_eq!((hidden.width, hidden.height), (1920, 1080));
    assert_eq!(alpha_sum(&hidden), 0);

    let one = surface.render_frame(&[1.0, 0.0]).unwrap();
    let both = surface.render_frame(&[1.0, 1.0]).unwrap();
    let half = surface.render_frame(&[0.5, 0.5]).unwrap();
    assert!(alpha_sum(&one) > 0);
    assert!(alpha_sum(&both) > alpha_sum(&one));
    assert!(alpha_sum(&half) < alpha_sum(&both));
    assert!(both.premultiplied);
}

#[test]
fn letter_count_mismatch_and_closed_surface_fail() {
    let Some(font) = test_font() else {
        return;
    };
    let factory = CpuSurfaceFactory::from_bytes(font).unwrap();
    let mut surface = factory.open("Hey", &TextStyle::title()).unwrap();
    assert!(surface.render_frame(&[1.0]).is_err());

    surface.close().unwrap();
    surface.close().unwrap();
    assert!(surface.render_frame(&[1.0, 1.0, 1.0]).is_err());
}

#[test]
fn text_bounds_sit_inside_the_viewport() {
    let Some(font) = test_font() else {
        return;
    };
    let factory = CpuSurfaceFactory::from_bytes(font).unwrap();
    let surface = factory.open("Hello", &TextStyle::title()).unwrap();
    let b = surface.text_bounds();
    assert!(b.x0 >= 0.0 && b.x1 <= 1920.0);
    assert!(b.y0 >= 0.0 && b.y1 <= 1080.0);
    assert!(b.height() > 0.0);
}
