//! Typographic style contract of the rasterizer.
//!
//! Title animations use one fixed style. Snapshots carry CSS-like strings which are parsed here,
//! on the rasterizer side; malformed values surface as render errors.

use crate::foundation::core::Vec2;
use crate::foundation::error::{FadeError, FadeResult};
use crate::render::color::ColorDef;
use crate::scene::request::SnapshotStyle;

/// Root font size used to resolve `rem` units.
const ROOT_FONT_SIZE_PX: f32 = 16.0;

/// Largest magnitude a resolved length may have.
pub const MAX_LENGTH_PX: f32 = 16_384.0;

/// Largest shadow offset and blur accepted from a snapshot request.
pub const MAX_SHADOW_PX: f32 = 256.0;

/// Line height of a text block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineHeight {
    /// Multiplier of the font size.
    Relative(f32),
    /// Absolute line height in pixels.
    Px(f32),
}

impl LineHeight {
    /// Resolve to a multiplier of `font_size_px`.
    pub fn as_multiplier(self, font_size_px: f32) -> f32 {
        match self {
            Self::Relative(m) => m,
            Self::Px(px) => px / font_size_px,
        }
    }
}

/// Box insets in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Insets {
    /// Top inset.
    pub top: f32,
    /// Right inset.
    pub right: f32,
    /// Bottom inset.
    pub bottom: f32,
    /// Left inset.
    pub left: f32,
}

impl Insets {
    /// Same inset on every side.
    pub fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// Drop shadow painted under the glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextShadow {
    /// Offset from the glyph position.
    pub offset: Vec2,
    /// Blur radius in pixels.
    pub blur_px: f32,
    /// Shadow color.
    pub color: ColorDef,
}

/// Outline painted over the glyph fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStroke {
    /// Stroke width in pixels, centered on the outline.
    pub width_px: f32,
    /// Stroke color.
    pub color: ColorDef,
}

/// Horizontal sizing of the text block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlockWidth {
    /// Block spans the whole viewport; lines are centered in it.
    FullViewport,
    /// Block shrinks to its content, wrapping at the given width.
    ShrinkToFit {
        /// Maximum content width in pixels.
        max_px: f32,
    },
}

/// Resolved text style consumed by rasterizers.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Glyph fill color.
    pub fill: ColorDef,
    /// Extra advance after each letter in pixels.
    pub letter_spacing_px: f32,
    /// Line height.
    pub line_height: LineHeight,
    /// Padding around the text content.
    pub padding: Insets,
    /// Optional drop shadow.
    pub shadow: Option<TextShadow>,
    /// Optional outline.
    pub stroke: Option<TextStroke>,
    /// Block sizing.
    pub width: BlockWidth,
}

impl TextStyle {
    /// Fixed style of title animations.
    pub fn title() -> Self {
        Self {
            font_size_px: 160.0,
            fill: ColorDef::rgba(164.0 / 255.0, 65.0 / 255.0, 0.0, 1.0),
            letter_spacing_px: 1.0,
            line_height: LineHeight::Relative(1.1),
            padding: Insets::default(),
            shadow: Some(TextShadow {
                offset: Vec2::new(5.0, 5.0),
                blur_px: 5.0,
                color: ColorDef::rgba(0.0, 0.0, 0.0, 0.3),
            }),
            stroke: Some(TextStroke {
                width_px: 8.0,
                color: ColorDef::rgba(1.0, 1.0, 1.0, 1.0),
            }),
            width: BlockWidth::FullViewport,
        }
    }

    /// Resolve the style strings of a snapshot request.
    pub fn from_snapshot(s: &SnapshotStyle) -> FadeResult<Self> {
        let font_size_px = parse_length(&s.font_size, ROOT_FONT_SIZE_PX)
            .map_err(|e| field_error("font_size", e))?;
        if font_size_px <= 0.0 {
            return Err(FadeError::render("font_size must be > 0"));
        }
        let fill = ColorDef::parse(&s.font_color).map_err(|e| field_error("font_color", e))?;
        let letter_spacing_px = if s.letter_spacing.trim() == "normal" {
            0.0
        } else {
            parse_length(&s.letter_spacing, font_size_px)
                .map_err(|e| field_error("letter_spacing", e))?
        };
        let line_height = parse_line_height(&s.line_height, font_size_px)
            .map_err(|e| field_error("line_height", e))?;
        let padding =
            parse_insets(&s.padding, font_size_px).map_err(|e| field_error("padding", e))?;

        let shadow_size = parse_length(&s.shadow_size, font_size_px)
            .map_err(|e| field_error("shadow_size", e))?;
        if shadow_size.abs() > MAX_SHADOW_PX {
            return Err(FadeError::render(format!(
                "shadow_size: {shadow_size}px exceeds {MAX_SHADOW_PX}px"
            )));
        }
        let shadow_opacity =
            parse_unit_interval(&s.shadow_opacity).map_err(|e| field_error("shadow_opacity", e))?;
        let shadow = (shadow_opacity > 0.0).then(|| TextShadow {
            offset: Vec2::new(f64::from(shadow_size), f64::from(shadow_size)),
            blur_px: shadow_size.max(0.0),
            color: ColorDef::rgba(0.0, 0.0, 0.0, shadow_opacity),
        });

        let stroke_px = parse_length(&s.stroke_size, font_size_px)
            .map_err(|e| field_error("stroke_size", e))?;
        let stroke_color =
            ColorDef::parse(&s.stroke_color).map_err(|e| field_error("stroke_color", e))?;
        let stroke = (stroke_px > 0.0).then_some(TextStroke {
            width_px: stroke_px,
            color: stroke_color,
        });

        let max_px =
            parse_length(&s.max_width, font_size_px).map_err(|e| field_error("max_width", e))?;
        if max_px <= 0.0 {
            return Err(FadeError::render("max_width must be > 0"));
        }

        Ok(Self {
            font_size_px,
            fill,
            letter_spacing_px,
            line_height,
            padding,
            shadow,
            stroke,
            width: BlockWidth::ShrinkToFit { max_px },
        })
    }

    /// How far painted pixels may extend past the glyph boxes.
    pub fn paint_overflow_px(&self) -> f32 {
        let stroke = self.stroke.map(|s| s.width_px / 2.0).unwrap_or(0.0);
        let shadow = self
            .shadow
            .map(|s| s.blur_px * 2.0 + s.offset.x.abs().max(s.offset.y.abs()) as f32)
            .unwrap_or(0.0);
        stroke + shadow
    }
}

fn field_error(field: &str, err: FadeError) -> FadeError {
    match err {
        FadeError::Render(msg) => FadeError::render(format!("{field}: {msg}")),
        other => other,
    }
}

/// Parse a CSS length (`px`, `em`, `rem` or unitless pixels).
pub fn parse_length(s: &str, em_px: f32) -> FadeResult<f32> {
    let t = s.trim().to_ascii_lowercase();
    let (num, scale) = if let Some(v) = t.strip_suffix("rem") {
        (v, ROOT_FONT_SIZE_PX)
    } else if let Some(v) = t.strip_suffix("px") {
        (v, 1.0)
    } else if let Some(v) = t.strip_suffix("em") {
        (v, em_px)
    } else {
        (t.as_str(), 1.0)
    };
    let v: f32 = num
        .trim()
        .parse()
        .map_err(|_| FadeError::render(format!("unsupported length \"{s}\"")))?;
    if !v.is_finite() {
        return Err(FadeError::render(format!("length must be finite: \"{s}\"")));
    }
    let px = v * scale;
    if !px.is_finite() || px.abs() > MAX_LENGTH_PX {
        return Err(FadeError::render(format!(
            "length \"{s}\" exceeds {MAX_LENGTH_PX}px"
        )));
    }
    Ok(px)
}

fn parse_line_height(s: &str, font_size_px: f32) -> FadeResult<LineHeight> {
    let t = s.trim().to_ascii_lowercase();
    if t == "normal" {
        return Ok(LineHeight::Relative(1.2));
    }
    if let Some(pct) = t.strip_suffix('%') {
        let v: f32 = pct
            .trim()
            .parse()
            .map_err(|_| FadeError::render(format!("unsupported line height \"{s}\"")))?;
        return Ok(LineHeight::Relative(v / 100.0));
    }
    if let Ok(v) = t.parse::<f32>() {
        if !(v.is_finite() && v > 0.0) {
            return Err(FadeError::render("line height must be > 0"));
        }
        return Ok(LineHeight::Relative(v));
    }
    let px = parse_length(&t, font_size_px)?;
    if px <= 0.0 {
        return Err(FadeError::render("line height must be > 0"));
    }
    Ok(LineHeight::Px(px))
}

fn parse_insets(s: &str, em_px: f32) -> FadeResult<Insets> {
    let parts = s
        .split_whitespace()
        .map(|p| parse_length(p, em_px))
        .collect::<FadeResult<Vec<f32>>>()?;
    let insets = match parts.as_slice() {
        [a] => Insets::uniform(*a),
        [v, h] => Insets {
            top: *v,
            right: *h,
            bottom: *v,
            left: *h,
        },
        [t, h, b] => Insets {
            top: *t,
            right: *h,
            bottom: *b,
            left: *h,
        },
        [t, r, b, l] => Insets {
            top: *t,
            right: *r,
            bottom: *b,
            left: *l,
        },
        _ => {
            return Err(FadeError::render(format!(
                "padding expects 1 to 4 lengths, got \"{s}\""
            )));
        }
    };
    if [insets.top, insets.right, insets.bottom, insets.left]
        .iter()
        .any(|v| *v < 0.0)
    {
        return Err(FadeError::render("padding must not be negative"));
    }
    Ok(insets)
}

fn parse_unit_interval(s: &str) -> FadeResult<f64> {
    let t = s.trim();
    let v = match t.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().map(|v| v / 100.0),
        None => t.parse::<f64>(),
    }
    .map_err(|_| FadeError::render(format!("unsupported opacity \"{s}\"")))?;
    if !v.is_finite() {
        return Err(FadeError::render(format!("opacity must be finite: \"{s}\"")));
    }
    Ok(v.clamp(0.0, 1.0))
}

#[cfg(test)]
#[path = "../../tests/unit/render/style.rs"]
mod tests;
