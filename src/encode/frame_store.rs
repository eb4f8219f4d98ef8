use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FadeError, FadeResult};
use crate::render::backend::FrameRGBA;

const MIN_PAD_DIGITS: usize = 3;

/// Ephemeral per-request directory of sequentially numbered PNG frames.
///
/// Frames are named `frame-000.png`, `frame-001.png`, ... with the zero padding widened when the
/// sequence needs more than three digits.
#[derive(Debug)]
pub struct FrameStore {
    dir: PathBuf,
    pad: usize,
    expected: Option<u64>,
    written: u64,
    removed: bool,
}

impl FrameStore {
    /// Create `root/name` as a fresh, empty frame directory.
    pub fn create(root: &Path, name: &str) -> FadeResult<Self> {
        let dir = root.join(name);
        if dir.exists() {
            return Err(FadeError::render(format!(
                "frame directory '{}' already exists",
                dir.display()
            )));
        }
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create frame directory '{}'", dir.display()))?;
        tracing::debug!(dir = %dir.display(), "frame directory created");
        Ok(Self {
            dir,
            pad: MIN_PAD_DIGITS,
            expected: None,
            written: 0,
            removed: false,
        })
    }

    /// Directory holding the frames.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Digits of zero padding used in frame names.
    pub fn pad_digits(&self) -> usize {
        self.pad
    }

    /// Frames written so far.
    pub fn frame_count(&self) -> u64 {
        self.written
    }

    /// Path of frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir
            .join(format!("frame-{:0width$}.png", idx.0, width = self.pad))
    }

    /// printf-style input pattern understood by `ffmpeg`'s image2 demuxer.
    pub fn ffmpeg_pattern(&self) -> PathBuf {
        self.dir.join(format!("frame-%0{}d.png", self.pad))
    }

    /// Delete the directory and everything in it. Removing twice, or removing a directory that
    /// is already gone, is a no-op.
    pub fn remove(&mut self) -> FadeResult<()> {
        if self.removed {
            return Ok(());
        }
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!(
                        "failed to remove frame directory '{}'",
                        self.dir.display()
                    ))
                    .into());
            }
        }
        self.removed = true;
        Ok(())
    }
}

/// Zero-padding width for a sequence of `total_frames` frames.
pub fn pad_digits_for(total_frames: u64) -> usize {
    let last = total_frames.saturating_sub(1);
    last.to_string().len().max(MIN_PAD_DIGITS)
}

impl FrameSink for FrameStore {
    fn begin(&mut self, cfg: SinkConfig) -> FadeResult<()> {
        if self.removed {
            return Err(FadeError::render("frame directory was already removed"));
        }
        if self.written != 0 {
            return Err(FadeError::render("frame directory is not empty"));
        }
        self.pad = pad_digits_for(cfg.total_frames);
        self.expected = Some(cfg.total_frames);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FadeResult<()> {
        if self.expected.is_none() {
            return Err(FadeError::render("frame store not started"));
        }
        if idx.0 != self.written {
            return Err(FadeError::render(format!(
                "frame {} written out of order, expected {}",
                idx.0, self.written
            )));
        }
        frame.save_png(&self.frame_path(idx))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> FadeResult<()> {
        let expected = self
            .expected
            .ok_or_else(|| FadeError::render("frame store not started"))?;
        if self.written != expected {
            return Err(FadeError::render(format!(
                "frame directory holds {} frames, expected {expected}",
                self.written
            )));
        }
        tracing::debug!(frames = self.written, dir = %self.dir.display(), "frames stored");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frame_store.rs"]
mod tests;
