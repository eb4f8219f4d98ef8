use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::FadeResult;
use crate::render::style::TextStyle;
use crate::scene::request::SnapshotRequest;
use crate::session::{RenderPipeline, new_request_id, run_tracked};
use crate::storage::PNG_CONTENT_TYPE;

/// Margin added around the text block before cropping.
pub const SNAPSHOT_MARGIN_PX: f64 = 5.0;

/// Result of a snapshot render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotOutcome {
    /// Public URL of the uploaded PNG.
    pub png_url: String,
    /// PNG width in pixels.
    pub width: u32,
    /// PNG height in pixels.
    pub height: u32,
}

/// Crop rectangle for a text block: the block grown by the margin, clamped to the canvas.
pub fn snapshot_crop(bounds: Rect, canvas: Canvas) -> Rect {
    bounds
        .inflate(SNAPSHOT_MARGIN_PX, SNAPSHOT_MARGIN_PX)
        .intersect(canvas.rect())
}

impl RenderPipeline {
    /// Render `req` once at full opacity, crop it to the text block and upload the PNG.
    pub fn render_snapshot(&self, req: &SnapshotRequest) -> FadeResult<SnapshotOutcome> {
        let request_id = new_request_id();
        let span = tracing::info_span!("snapshot", request_id = %request_id);
        let _enter = span.enter();

        req.validate()?;
        tracing::info!(output = %req.output_file_name, "snapshot request accepted");
        let style = TextStyle::from_snapshot(&req.style)?;
        self.ensure_work_dir()?;

        run_tracked(&request_id, |c| {
            let surface = self.surfaces.open(&req.text, &style)?;
            c.track_surface(surface)?;
            c.start()?;

            let cropped = {
                let surface = c.surface_mut()?;
                let opacities = vec![1.0f32; surface.letters_count()];
                let frame = surface.render_frame(&opacities)?;
                frame.crop(snapshot_crop(surface.text_bounds(), surface.canvas()))?
            };

            let png_path = self.work_dir.join(format!("{request_id}.png"));
            c.track_artifact(&png_path)?;
            cropped.save_png(&png_path)?;

            let png_url = self
                .store
                .upload(&png_path, &req.output_file_name, PNG_CONTENT_TYPE)?;
            c.succeed()?;

            tracing::info!(
                url = %png_url,
                width = cropped.width,
                height = cropped.height,
                "snapshot rendered"
            );
            Ok(SnapshotOutcome {
                png_url,
                width: cropped.width,
                height: cropped.height,
            })
        })
    }
}
