use std::path::{Path, PathBuf};

use crate::encode::ffmpeg::{ALPHA_PIXEL_FORMAT, FrameSequence, TransparencyVerifier, VideoEncoder};
use crate::foundation::error::FadeResult;

/// An encoded container plus what the probe found in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedArtifact {
    /// Local path of the container.
    pub path: PathBuf,
    /// Pixel format of the first video stream.
    pub pixel_format: String,
    /// `pixel_format == "yuva420p"`.
    pub has_alpha: bool,
}

impl EncodedArtifact {
    /// Record a probe result for the container at `path`.
    pub fn new(path: PathBuf, pixel_format: impl Into<String>) -> Self {
        let pixel_format = pixel_format.into();
        let has_alpha = pixel_format == ALPHA_PIXEL_FORMAT;
        Self {
            path,
            pixel_format,
            has_alpha,
        }
    }
}

/// Encode `seq` into `out_path`, then probe the result.
///
/// A container without alpha is reported, not rejected.
#[tracing::instrument(level = "debug", skip_all, fields(out = %out_path.display()))]
pub fn encode_and_verify(
    encoder: &dyn VideoEncoder,
    verifier: &dyn TransparencyVerifier,
    seq: &FrameSequence,
    out_path: &Path,
) -> FadeResult<EncodedArtifact> {
    encoder.encode(seq, out_path)?;
    let pixel_format = verifier.pixel_format(out_path)?;
    let artifact = EncodedArtifact::new(out_path.to_path_buf(), pixel_format);
    if artifact.has_alpha {
        tracing::info!(pixel_format = %artifact.pixel_format, "container carries alpha");
    } else {
        tracing::warn!(pixel_format = %artifact.pixel_format, "container has no alpha plane");
    }
    Ok(artifact)
}
