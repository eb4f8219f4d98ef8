use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{FadeError, FadeResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::style::TextStyle;

/// A rendered frame as RGBA8 pixels.
///
/// Frames produced by the CPU rasterizer are **premultiplied alpha**; the `premultiplied` flag
/// makes this explicit at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
            premultiplied: true,
        }
    }

    /// Copy of the pixels inside `rect`, with `rect` snapped outward to whole pixels and
    /// clamped to the frame.
    pub fn crop(&self, rect: Rect) -> FadeResult<FrameRGBA> {
        let x0 = rect.x0.floor().max(0.0) as u32;
        let y0 = rect.y0.floor().max(0.0) as u32;
        let x1 = (rect.x1.ceil().max(0.0) as u32).min(self.width);
        let y1 = (rect.y1.ceil().max(0.0) as u32).min(self.height);
        if x1 <= x0 || y1 <= y0 {
            return Err(FadeError::render(format!(
                "crop rectangle {rect:?} does not intersect the {}x{} frame",
                self.width, self.height
            )));
        }

        let (w, h) = (x1 - x0, y1 - y0);
        let stride = self.width as usize * 4;
        let mut data = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for y in y0..y1 {
            let start = y as usize * stride + x0 as usize * 4;
            data.extend_from_slice(&self.data[start..start + w as usize * 4]);
        }
        Ok(FrameRGBA {
            width: w,
            height: h,
            data,
            premultiplied: self.premultiplied,
        })
    }

    /// Straight-alpha bytes, suitable for PNG encoding.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Encode as a straight-alpha PNG file.
    pub fn save_png(&self, path: &std::path::Path) -> FadeResult<()> {
        image::save_buffer_with_format(
            path,
            &self.to_straight_rgba8(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| FadeError::render(format!("write png '{}': {e}", path.display())))
    }
}

/// One rendering-surface session holding a laid-out text block.
///
/// A surface is owned by exactly one request. Letter opacity state is mutated on every
/// [`RenderSurface::render_frame`] call, so calls must not interleave.
pub trait RenderSurface: Send {
    /// Viewport the surface renders into.
    fn canvas(&self) -> Canvas;

    /// Number of letters in the laid-out text (newlines excluded).
    fn letters_count(&self) -> usize;

    /// Bounding box of the text block, padding included, in viewport coordinates.
    fn text_bounds(&self) -> Rect;

    /// Rasterize the text with one opacity per letter onto a transparent background.
    fn render_frame(&mut self, opacities: &[f32]) -> FadeResult<FrameRGBA>;

    /// Release the surface. Further renders fail; closing twice is a no-op.
    fn close(&mut self) -> FadeResult<()>;
}

/// Opens rendering surfaces; shared by all requests.
pub trait SurfaceFactory: Send + Sync {
    /// Lay out `text` with `style` on a fresh surface.
    fn open(&self, text: &str, style: &TextStyle) -> FadeResult<Box<dyn RenderSurface>>;
}
