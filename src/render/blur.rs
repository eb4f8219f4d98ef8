//! Separable Q16 gaussian blur on premultiplied RGBA8, used for text shadows.

use crate::foundation::error::{FadeError, FadeResult};

/// Pixel-aligned region `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PixelRegion {
    pub(crate) x0: u32,
    pub(crate) y0: u32,
    pub(crate) x1: u32,
    pub(crate) y1: u32,
}

impl PixelRegion {
    pub(crate) fn width(self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub(crate) fn height(self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub(crate) fn is_empty(self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Kernel radius cap: the viewport diagonal, rounded up.
pub(crate) const MAX_BLUR_RADIUS: u32 = 2_203;

/// Blur radius and sigma for a CSS blur length (`sigma = blur / 2`). The radius is capped at
/// [`MAX_BLUR_RADIUS`].
pub(crate) fn css_blur_params(blur_px: f32) -> (u32, f32) {
    if !blur_px.is_finite() || blur_px <= 0.0 {
        return (0, 0.0);
    }
    let sigma = blur_px / 2.0;
    let radius = (f64::from(sigma) * 3.0).ceil().min(f64::from(MAX_BLUR_RADIUS)) as u32;
    (radius, sigma)
}

/// Blur the pixels of `region` in place. Pixels outside the region are untouched; samples past
/// the region edge clamp to the edge.
pub(crate) fn blur_region_in_place(
    buf: &mut [u8],
    width: u32,
    height: u32,
    region: PixelRegion,
    kernel_q16: &[u32],
) -> FadeResult<()> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FadeError::render("blur buffer size overflow"))?;
    if buf.len() != expected_len {
        return Err(FadeError::render(
            "blur_region_in_place expects buf matching width*height*4",
        ));
    }
    let region = PixelRegion {
        x0: region.x0.min(width),
        y0: region.y0.min(height),
        x1: region.x1.min(width),
        y1: region.y1.min(height),
    };
    if region.is_empty() || kernel_q16.len() <= 1 {
        return Ok(());
    }

    let (rw, rh) = (region.width(), region.height());
    let row_bytes = rw as usize * 4;
    let mut src = Vec::with_capacity(row_bytes * rh as usize);
    for y in region.y0..region.y1 {
        let start = (y as usize * width as usize + region.x0 as usize) * 4;
        src.extend_from_slice(&buf[start..start + row_bytes]);
    }

    let mut tmp = vec![0u8; src.len()];
    horizontal_pass(&src, &mut tmp, rw, rh, kernel_q16);
    vertical_pass(&tmp, &mut src, rw, rh, kernel_q16);

    for (row, y) in (region.y0..region.y1).enumerate() {
        let start = (y as usize * width as usize + region.x0 as usize) * 4;
        buf[start..start + row_bytes].copy_from_slice(&src[row * row_bytes..(row + 1) * row_bytes]);
    }
    Ok(())
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FadeResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FadeError::render("blur sigma must be > 0"));
    }

    if radius > MAX_BLUR_RADIUS {
        return Err(FadeError::render(format!(
            "blur radius {radius} exceeds {MAX_BLUR_RADIUS}"
        )));
    }
    let r = i32::try_from(radius).map_err(|_| FadeError::render("blur radius overflow"))?;
    let taps = r
        .checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .ok_or_else(|| FadeError::render("blur radius overflow"))?;
    let mut weights_f = Vec::<f64>::with_capacity(taps as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(FadeError::render("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}
