use super::*;

fn snapshot_style() -> SnapshotStyle {
    SnapshotStyle {
        font_size: "64px".to_owned(),
        font_color: "#ffffff".to_owned(),
        letter_spacing: "2px".to_owned(),
        line_height: "1.2".to_owned(),
        padding: "10px".to_owned(),
        shadow_size: "4px".to_owned(),
        shadow_opacity: "0.5".to_owned(),
        stroke_size: "2px".to_owned(),
        stroke_color: "black".to_owned(),
        max_width: "850px".to_owned(),
    }
}

#[test]
fn title_style_is_fixed() {
    let s = TextStyle::title();
    assert_eq!(s.font_size_px, 160.0);
    assert_eq!(s.fill.to_rgba8(), [0xa4, 0x41, 0x00, 255]);
    assert_eq!(s.line_height, LineHeight::Relative(1.1));
    assert_eq!(s.stroke.unwrap().width_px, 8.0);
    assert_eq!(s.shadow.unwrap().offset, Vec2::new(5.0, 5.0));
    assert_eq!(s.width, BlockWidth::FullViewport);
}

#[test]
fn snapshot_strings_resolve_to_pixels() {
    let s = TextStyle::from_snapshot(&snapshot_style()).unwrap();
    assert_eq!(s.font_size_px, 64.0);
    assert_eq!(s.letter_spacing_px, 2.0);
    assert_eq!(s.line_height, LineHeight::Relative(1.2));
    assert_eq!(s.padding, Insets::uniform(10.0));
    let shadow = s.shadow.unwrap();
    assert_eq!(shadow.blur_px, 4.0);
    assert_eq!(shadow.color.a, 0.5);
    assert_eq!(s.stroke.unwrap().color.to_rgba8(), [0, 0, 0, 255]);
    assert_eq!(s.width, BlockWidth::ShrinkToFit { max_px: 850.0 });
}

#[test]
fn lengths_accept_units() {
    assert_eq!(parse_length("12px", 20.0).unwrap(), 12.0);
    assert_eq!(parse_length(" 7 ", 20.0).unwrap(), 7.0);
    assert_eq!(parse_length("0.5em", 20.0).unwrap(), 10.0);
    assert_eq!(parse_length("2rem", 20.0).unwrap(), 32.0);
    assert_eq!(parse_length("-1px", 20.0).unwrap(), -1.0);
    assert!(parse_length("12pt", 20.0).is_err());
    assert!(parse_length("wide", 20.0).is_err());
}

#[test]
fn line_height_forms() {
    assert_eq!(
        parse_line_height("normal", 10.0).unwrap(),
        LineHeight::Relative(1.2)
    );
    assert_eq!(
        parse_line_height("150%", 10.0).unwrap(),
        LineHeight::Relative(1.5)
    );
    assert_eq!(parse_line_height("30px", 10.0).unwrap(), LineHeight::Px(30.0));
    assert_eq!(LineHeight::Px(30.0).as_multiplier(10.0), 3.0);
    assert!(parse_line_height("0", 10.0).is_err());
}

#[test]
fn padding_shorthand_expands() {
    let i = parse_insets("1px 2px 3px", 10.0).unwrap();
    assert_eq!((i.top, i.right, i.bottom, i.left), (1.0, 2.0, 3.0, 2.0));
    assert!(parse_insets("1px 2px 3px 4px 5px", 10.0).is_err());
    assert!(parse_insets("-1px", 10.0).is_err());
}

#[test]
fn zero_stroke_and_shadow_are_dropped() {
    let mut raw = snapshot_style();
    raw.stroke_size = "0px".to_owned();
    raw.shadow_opacity = "0".to_owned();
    let s = TextStyle::from_snapshot(&raw).unwrap();
    assert!(s.stroke.is_none());
    assert!(s.shadow.is_none());
}

#[test]
fn bad_values_name_the_field() {
    let mut raw = snapshot_style();
    raw.font_color = "not-a-color".to_owned();
    let err = TextStyle::from_snapshot(&raw).unwrap_err();
    assert!(matches!(err, FadeError::Render(_)));
    assert!(err.to_string().contains("font_color"));
}

#[test]
fn oversized_lengths_are_render_errors() {
    assert!(parse_length("3e9px", 20.0).is_err());
    assert!(parse_length("1e6em", 20.0).is_err());
    assert_eq!(parse_length("16384px", 20.0).unwrap(), MAX_LENGTH_PX);

    let mut raw = snapshot_style();
    raw.shadow_size = "3e9px".to_owned();
    let err = TextStyle::from_snapshot(&raw).unwrap_err();
    assert!(matches!(err, FadeError::Render(_)));
    assert!(err.to_string().contains("shadow_size"));

    raw.shadow_size = "4000px".to_owned();
    let err = TextStyle::from_snapshot(&raw).unwrap_err();
    assert!(err.to_string().contains("shadow_size"));
}

#[test]
fn largest_shadow_builds_a_bounded_kernel() {
    let mut raw = snapshot_style();
    raw.shadow_size = format!("{MAX_SHADOW_PX}px");
    let s = TextStyle::from_snapshot(&raw).unwrap();
    let (radius, sigma) = crate::render::blur::css_blur_params(s.shadow.unwrap().blur_px);
    assert_eq!(radius, 384);
    let k = crate::render::blur::gaussian_kernel_q16(radius, sigma).unwrap();
    assert_eq!(k.len(), 769);
}
