use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{FadeError, FadeResult};
use crate::foundation::math::{clamp01, premul_over_in_place};
use crate::render::backend::{FrameRGBA, RenderSurface, SurfaceFactory};
use crate::render::blur::{PixelRegion, blur_region_in_place, css_blur_params, gaussian_kernel_q16};
use crate::render::style::TextStyle;
use crate::render::text::{TextBlock, TextLayoutEngine};

/// Opens CPU rendering surfaces backed by `vello_cpu`, all sharing one font face.
pub struct CpuSurfaceFactory {
    font_bytes: Arc<Vec<u8>>,
    font: vello_cpu::peniko::FontData,
    canvas: Canvas,
}

impl CpuSurfaceFactory {
    /// Load the font file at `path`.
    pub fn from_font_path(path: &Path) -> FadeResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| FadeError::config(format!("read font '{}': {e}", path.display())))?;
        Self::from_bytes(bytes)
    }

    /// Use raw font bytes (TTF/OTF). Fails if no font family can be registered from them.
    pub fn from_bytes(font_bytes: Vec<u8>) -> FadeResult<Self> {
        let engine = TextLayoutEngine::new(&font_bytes)?;
        tracing::info!(family = engine.family_name(), "font loaded");

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.clone()),
            0,
        );
        Ok(Self {
            font_bytes: Arc::new(font_bytes),
            font,
            canvas: Canvas::VIEWPORT,
        })
    }
}

impl SurfaceFactory for CpuSurfaceFactory {
    fn open(&self, text: &str, style: &TextStyle) -> FadeResult<Box<dyn RenderSurface>> {
        let width: u16 = self
            .canvas
            .width
            .try_into()
            .map_err(|_| FadeError::render("surface width exceeds u16"))?;
        let height: u16 = self
            .canvas
            .height
            .try_into()
            .map_err(|_| FadeError::render("surface height exceeds u16"))?;

        let mut engine = TextLayoutEngine::new(&self.font_bytes)?;
        let block = engine.layout_block(text, style, self.canvas)?;

        let shadow_kernel = match style.shadow {
            Some(shadow) => {
                let (radius, sigma) = css_blur_params(shadow.blur_px);
                gaussian_kernel_q16(radius, sigma)?
            }
            None => vec![1 << 16],
        };

        Ok(Box::new(CpuSurface {
            width,
            height,
            canvas: self.canvas,
            block,
            style: style.clone(),
            font: self.font.clone(),
            shadow_kernel,
            closed: false,
        }))
    }
}

/// One laid-out text block plus the state needed to rasterize it frame after frame.
pub struct CpuSurface {
    width: u16,
    height: u16,
    canvas: Canvas,
    block: TextBlock,
    style: TextStyle,
    font: vello_cpu::peniko::FontData,
    shadow_kernel: Vec<u32>,
    closed: bool,
}

/// Which layer of the text is being painted.
#[derive(Clone, Copy)]
enum Pass {
    Shadow,
    Main,
}

impl CpuSurface {
    fn paint_letters(&self, pass: Pass, opacities: &[f32]) -> vello_cpu::Pixmap {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        let transform = match (pass, self.style.shadow) {
            (Pass::Shadow, Some(shadow)) => {
                vello_cpu::kurbo::Affine::translate((shadow.offset.x, shadow.offset.y))
            }
            _ => vello_cpu::kurbo::Affine::IDENTITY,
        };
        ctx.set_transform(transform);

        let (fill, stroke_color) = match (pass, self.style.shadow) {
            (Pass::Shadow, Some(shadow)) => (shadow.color, shadow.color),
            _ => (
                self.style.fill,
                self.style.stroke.map(|s| s.color).unwrap_or(self.style.fill),
            ),
        };
        if let Some(stroke) = self.style.stroke {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(stroke.width_px)));
        }

        for (letter, &opacity) in self.block.letters.iter().zip(opacities) {
            let opacity = clamp01(f64::from(opacity)) as f32;
            if opacity <= 0.0 || letter.glyphs.is_empty() {
                continue;
            }
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }

            ctx.set_paint(fill.to_paint());
            ctx.glyph_run(&self.font)
                .font_size(self.block.font_size)
                .fill_glyphs(letter.glyphs.iter().copied());

            if self.style.stroke.is_some() {
                ctx.set_paint(stroke_color.to_paint());
                ctx.glyph_run(&self.font)
                    .font_size(self.block.font_size)
                    .stroke_glyphs(letter.glyphs.iter().copied());
            }

            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        pixmap
    }

    /// Pixels the shadow may reach: content box grown by the paint overflow, clamped.
    fn shadow_region(&self) -> PixelRegion {
        let grow = f64::from(self.style.paint_overflow_px()) + f64::from(self.block.font_size);
        let r = self.block.content.inflate(grow, grow).intersect(self.canvas.rect());
        PixelRegion {
            x0: r.x0.floor().max(0.0) as u32,
            y0: r.y0.floor().max(0.0) as u32,
            x1: r.x1.ceil().max(0.0) as u32,
            y1: r.y1.ceil().max(0.0) as u32,
        }
    }
}

impl RenderSurface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn letters_count(&self) -> usize {
        self.block.letters.len()
    }

    fn text_bounds(&self) -> Rect {
        self.block.bounds
    }

    fn render_frame(&mut self, opacities: &[f32]) -> FadeResult<FrameRGBA> {
        if self.closed {
            return Err(FadeError::render("render on a closed surface"));
        }
        if opacities.len() != self.block.letters.len() {
            return Err(FadeError::render(format!(
                "expected {} letter opacities, got {}",
                self.block.letters.len(),
                opacities.len()
            )));
        }
        if opacities.iter().all(|o| *o <= 0.0 || o.is_nan()) {
            return Ok(FrameRGBA::transparent(self.canvas.width, self.canvas.height));
        }

        let main = self.paint_letters(Pass::Main, opacities);
        if self.style.shadow.is_none() {
            return Ok(FrameRGBA {
                width: self.canvas.width,
                height: self.canvas.height,
                data: main.data_as_u8_slice().to_vec(),
                premultiplied: true,
            });
        }

        let shadow = self.paint_letters(Pass::Shadow, opacities);
        let mut data = shadow.data_as_u8_slice().to_vec();
        blur_region_in_place(
            &mut data,
            self.canvas.width,
            self.canvas.height,
            self.shadow_region(),
            &self.shadow_kernel,
        )?;
        if !premul_over_in_place(&mut data, main.data_as_u8_slice()) {
            return Err(FadeError::render("shadow and text layers differ in size"));
        }

        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
            premultiplied: true,
        })
    }

    fn close(&mut self) -> FadeResult<()> {
        if !self.closed {
            self.closed = true;
            tracing::debug!("surface closed");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
