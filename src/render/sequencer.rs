//! The frame loop: one opacity vector, one raster and one sink push per frame, strictly in order.

use crate::animation::fade::FadeTimeline;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{FadeError, FadeResult};
use crate::render::backend::RenderSurface;

/// Summary of a completed frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceStats {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Frame rate the sequence was rendered at.
    pub fps: Fps,
}

/// Render every frame of `timeline` at `fps` and push them to `sink` in order.
///
/// Stops at the first failing frame; the sink is not ended in that case.
#[tracing::instrument(level = "debug", skip_all, fields(letters = timeline.letters_count()))]
pub fn sequence_frames(
    timeline: &FadeTimeline,
    fps: Fps,
    surface: &mut dyn RenderSurface,
    sink: &mut dyn FrameSink,
) -> FadeResult<SequenceStats> {
    if surface.letters_count() != timeline.letters_count() {
        return Err(FadeError::render(format!(
            "surface laid out {} letters, timeline expects {}",
            surface.letters_count(),
            timeline.letters_count()
        )));
    }

    let total_frames = timeline.total_frames(fps);
    let canvas = surface.canvas();
    tracing::info!(total_frames, fps = %fps.to_ffmpeg_rate(), "frame plan");
    for slot in timeline.slots() {
        tracing::trace!(letter = slot.index, start = slot.start_time, "letter onset");
    }

    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
        total_frames,
    })?;

    let mut opacities = Vec::with_capacity(timeline.letters_count());
    for idx in 0..total_frames {
        let t = fps.frame_time_secs(FrameIndex(idx));
        timeline.fill_opacities(t, &mut opacities);
        let frame = surface.render_frame(&opacities).map_err(|e| {
            tracing::error!(frame = idx, error = %e, "frame rasterization failed");
            e
        })?;
        sink.push_frame(FrameIndex(idx), &frame)?;
    }

    sink.end()?;
    Ok(SequenceStats {
        frames: total_frames,
        fps,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/sequencer.rs"]
mod tests;
