//! Text layout: shapes a block of text with Parley and splits the result into per-letter glyph
//! groups positioned in viewport coordinates.

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{FadeError, FadeResult};
use crate::render::style::{BlockWidth, TextStyle};
use crate::scene::request::is_line_break;

/// Glyphs of one letter slot, in viewport coordinates.
#[derive(Clone, Debug, Default)]
pub(crate) struct LetterGlyphs {
    pub(crate) glyphs: Vec<vello_cpu::Glyph>,
}

/// A shaped, positioned text block.
#[derive(Clone, Debug)]
pub(crate) struct TextBlock {
    /// One entry per letter slot. Whitespace letters have no glyphs worth painting but keep their
    /// slot so indices line up with the fade timeline.
    pub(crate) letters: Vec<LetterGlyphs>,
    pub(crate) font_size: f32,
    /// Block box, padding included.
    pub(crate) bounds: Rect,
    /// Union of the line boxes, padding excluded.
    pub(crate) content: Rect,
}

/// Stateful helper for building Parley layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `font_bytes` and remember the family it declares.
    pub(crate) fn new(font_bytes: &[u8]) -> FadeResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| FadeError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FadeError::render("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    pub(crate) fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` with `style` and center the resulting block in `canvas`.
    #[tracing::instrument(level = "debug", skip(self, text, style), fields(chars = text.chars().count()))]
    pub(crate) fn layout_block(
        &mut self,
        text: &str,
        style: &TextStyle,
        canvas: Canvas,
    ) -> FadeResult<TextBlock> {
        let size_px = style.font_size_px;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FadeError::render("font size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(
            style.letter_spacing_px,
        ));
        builder.push_default(parley::style::StyleProperty::LineHeight(
            parley::style::LineHeight::FontSizeRelative(
                style.line_height.as_multiplier(size_px),
            ),
        ));

        let mut layout: parley::Layout<()> = builder.build(text);

        let pad = style.padding;
        let horizontal_pad = pad.left + pad.right;
        let vertical_pad = pad.top + pad.bottom;
        let canvas_w = canvas.width as f32;
        let canvas_h = canvas.height as f32;

        // Content width the lines are centered in, and the block's left edge.
        let (content_w, block_x) = match style.width {
            BlockWidth::FullViewport => {
                let w = (canvas_w - horizontal_pad).max(1.0);
                layout.break_all_lines(Some(w));
                (w, 0.0)
            }
            BlockWidth::ShrinkToFit { max_px } => {
                layout.break_all_lines(Some(max_px));
                let w = layout.width().min(max_px);
                (w, (canvas_w - (w + horizontal_pad)) / 2.0)
            }
        };
        layout.align(
            Some(content_w),
            parley::Alignment::Center,
            parley::AlignmentOptions::default(),
        );

        let content_h = layout.height();
        let block_w = content_w + horizontal_pad;
        let block_h = content_h + vertical_pad;
        let block_y = (canvas_h - block_h) / 2.0;
        let origin_x = block_x + pad.left;
        let origin_y = block_y + pad.top;

        let slot_of_byte = letter_slot_offsets(text);
        let mut letters = vec![LetterGlyphs::default(); slot_of_byte.len()];

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let baseline = run.baseline();
                let mut pen_x = run.offset();
                for cluster in run.run().visual_clusters() {
                    let slot = slot_for_byte(&slot_of_byte, cluster.text_range().start);
                    for g in cluster.glyphs() {
                        if let Some(slot) = slot {
                            letters[slot].glyphs.push(vello_cpu::Glyph {
                                id: g.id,
                                x: origin_x + pen_x + g.x,
                                y: origin_y + baseline + g.y,
                            });
                        }
                        pen_x += g.advance;
                    }
                }
            }
        }

        let content = Rect::new(
            f64::from(origin_x),
            f64::from(origin_y),
            f64::from(origin_x + content_w),
            f64::from(origin_y + content_h),
        );
        let bounds = Rect::new(
            f64::from(block_x),
            f64::from(block_y),
            f64::from(block_x + block_w),
            f64::from(block_y + block_h),
        );

        tracing::debug!(
            letters = letters.len(),
            lines = layout.len(),
            ?bounds,
            "laid out text block"
        );

        Ok(TextBlock {
            letters,
            font_size: size_px,
            bounds,
            content,
        })
    }
}

/// Byte offset of every letter slot, in text order.
fn letter_slot_offsets(text: &str) -> Vec<usize> {
    text.char_indices()
        .filter(|(_, c)| !is_line_break(*c))
        .map(|(i, _)| i)
        .collect()
}

/// Letter slot owning the character at `byte`. Line breaks own no slot.
fn slot_for_byte(offsets: &[usize], byte: usize) -> Option<usize> {
    offsets.binary_search(&byte).ok()
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
