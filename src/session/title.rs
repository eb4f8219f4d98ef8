use crate::encode::artifact::encode_and_verify;
use crate::encode::ffmpeg::FrameSequence;
use crate::encode::frame_store::FrameStore;
use crate::foundation::error::FadeResult;
use crate::render::sequencer::sequence_frames;
use crate::render::style::TextStyle;
use crate::scene::request::AnimationRequest;
use crate::session::{RenderPipeline, new_request_id, run_tracked};
use crate::storage::WEBM_CONTENT_TYPE;

/// Result of a title render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleOutcome {
    /// Public URL of the uploaded clip.
    pub webm_url: String,
    /// Pixel format reported by the verifier.
    pub pixel_format: String,
    /// Whether the clip carries an alpha plane.
    pub has_alpha: bool,
    /// Frames encoded.
    pub frames: u64,
}

impl RenderPipeline {
    /// Render `req` as a transparent WebM clip and upload it.
    ///
    /// Validation happens before any resource is acquired. Every scratch file is gone when this
    /// returns, on success and on failure.
    pub fn render_title(&self, req: &AnimationRequest) -> FadeResult<TitleOutcome> {
        let request_id = new_request_id();
        let span = tracing::info_span!("title", request_id = %request_id);
        let _enter = span.enter();

        req.validate()?;
        let timeline = req.timeline()?;
        tracing::info!(
            letters = timeline.letters_count(),
            output = %req.output_file_name,
            "title request accepted"
        );
        self.ensure_work_dir()?;

        run_tracked(&request_id, |c| {
            let surface = self.surfaces.open(&req.text, &TextStyle::title())?;
            c.track_surface(surface)?;
            let frames = FrameStore::create(&self.work_dir, &format!("frames-{request_id}"))?;
            c.track_frames(frames)?;
            c.start()?;

            let seq = {
                let (surface, frames) = c.surface_and_frames()?;
                sequence_frames(&timeline, self.fps, surface, &mut *frames)?;
                FrameSequence::from_store(frames, self.fps)
            };

            let out_path = self.work_dir.join(format!("{request_id}.webm"));
            c.track_artifact(&out_path)?;
            let artifact = encode_and_verify(
                self.encoder.as_ref(),
                self.verifier.as_ref(),
                &seq,
                &out_path,
            )?;

            let webm_url =
                self.store
                    .upload(&artifact.path, &req.output_file_name, WEBM_CONTENT_TYPE)?;
            c.succeed()?;

            tracing::info!(url = %webm_url, has_alpha = artifact.has_alpha, "title rendered");
            Ok(TitleOutcome {
                webm_url,
                pixel_format: artifact.pixel_format,
                has_alpha: artifact.has_alpha,
                frames: seq.frames,
            })
        })
    }
}
