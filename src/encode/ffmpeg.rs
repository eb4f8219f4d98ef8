use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::encode::frame_store::FrameStore;
use crate::foundation::core::Fps;
use crate::foundation::error::{FadeError, FadeResult};

/// Pixel format of a VP9 stream carrying an alpha plane.
pub const ALPHA_PIXEL_FORMAT: &str = "yuva420p";

/// An ordered on-disk frame sequence ready for encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSequence {
    /// printf-style path pattern (`.../frame-%03d.png`).
    pub pattern: PathBuf,
    /// Number of frames, numbered from zero.
    pub frames: u64,
    /// Playback rate.
    pub fps: Fps,
}

impl FrameSequence {
    /// Describe the frames currently held by `store`.
    pub fn from_store(store: &FrameStore, fps: Fps) -> Self {
        Self {
            pattern: store.ffmpeg_pattern(),
            frames: store.frame_count(),
            fps,
        }
    }
}

/// Turns a frame sequence into a video container.
pub trait VideoEncoder: Send + Sync {
    /// Encode `seq` into `out_path`, blocking until the container is written.
    fn encode(&self, seq: &FrameSequence, out_path: &Path) -> FadeResult<()>;
}

/// Reads back the pixel format of an encoded container's first video stream.
pub trait TransparencyVerifier: Send + Sync {
    /// Pixel format name as reported by the probe, trimmed.
    fn pixel_format(&self, path: &Path) -> FadeResult<String>;
}

/// VP9-in-WebM encoder with an alpha plane, running the system `ffmpeg`.
#[derive(Clone, Debug)]
pub struct FfmpegWebmEncoder {
    program: PathBuf,
}

impl Default for FfmpegWebmEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegWebmEncoder {
    /// Use `program` as the `ffmpeg` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The full argument list passed to `ffmpeg`.
    pub fn args(seq: &FrameSequence, out_path: &Path) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y",
            "-loglevel",
            "error",
            "-framerate",
            &seq.fps.to_ffmpeg_rate(),
            "-start_number",
            "0",
            "-i",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(seq.pattern.to_string_lossy().into_owned());
        args.extend(
            [
                "-c:v",
                "libvpx-vp9",
                "-pix_fmt",
                ALPHA_PIXEL_FORMAT,
                "-metadata:s:v:0",
                "alpha_mode=1",
                "-b:v",
                "2M",
                "-deadline",
                "best",
                "-cpu-used",
                "0",
                "-row-mt",
                "1",
                "-f",
                "webm",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(out_path.to_string_lossy().into_owned());
        args
    }
}

impl VideoEncoder for FfmpegWebmEncoder {
    #[tracing::instrument(level = "info", skip_all, fields(frames = seq.frames, out = %out_path.display()))]
    fn encode(&self, seq: &FrameSequence, out_path: &Path) -> FadeResult<()> {
        if seq.frames == 0 {
            return Err(FadeError::encode("no frames to encode"));
        }
        ensure_parent_dir(out_path)?;

        tracing::info!("encode start");
        let output = Command::new(&self.program)
            .args(Self::args(seq, out_path))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                FadeError::encode(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FadeError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        tracing::info!("encode finished");
        Ok(())
    }
}

/// Pixel-format probe running the system `ffprobe`.
#[derive(Clone, Debug)]
pub struct FfprobeVerifier {
    program: PathBuf,
}

impl Default for FfprobeVerifier {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeVerifier {
    /// Use `program` as the `ffprobe` executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TransparencyVerifier for FfprobeVerifier {
    fn pixel_format(&self, path: &Path) -> FadeResult<String> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=pix_fmt",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                FadeError::encode(format!(
                    "failed to spawn '{}': {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FadeError::encode(format!(
                "ffprobe exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> FadeResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `program -version` runs successfully.
pub fn is_tool_available(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
