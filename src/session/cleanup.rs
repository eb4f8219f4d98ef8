//! Resource lifecycle of one request.
//!
//! ```text
//! Acquiring ──► Running ──► Succeeded ─┐
//!     │            │                   ├──► Cleaning ──► Done
//!     └────────────┴──────► Failed ────┘
//! ```
//!
//! Every resource that was acquired is released exactly once, in the order rendering surface,
//! output artifact, frame directory. Release failures are logged and reported, never raised.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::encode::frame_store::FrameStore;
use crate::foundation::error::{FadeError, FadeResult};
use crate::render::backend::RenderSurface;

/// Lifecycle state of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Resources are being acquired.
    Acquiring,
    /// The pipeline is running.
    Running,
    /// The pipeline produced its result.
    Succeeded,
    /// The pipeline failed.
    Failed,
    /// Resources are being released.
    Cleaning,
    /// Every acquired resource has been released.
    Done,
}

/// Kinds of resources the coordinator tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    /// The rendering surface session.
    Surface,
    /// The locally written output file.
    Artifact,
    /// The per-request frame directory.
    FrameDir,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Surface => "surface",
            Self::Artifact => "artifact",
            Self::FrameDir => "frame directory",
        })
    }
}

enum Tracked<T> {
    Vacant,
    Acquired(T),
    Released,
}

impl<T> Tracked<T> {
    fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, Tracked::Released) {
            Tracked::Acquired(v) => Some(v),
            Tracked::Vacant => {
                *self = Tracked::Vacant;
                None
            }
            Tracked::Released => None,
        }
    }

    fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Tracked::Acquired(v) => Some(v),
            _ => None,
        }
    }

    fn is_vacant(&self) -> bool {
        matches!(self, Tracked::Vacant)
    }
}

/// What a cleanup pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// Resources released, in release order.
    pub released: Vec<ResourceKind>,
    /// Resources whose release failed, with the failure message.
    pub failures: Vec<(ResourceKind, String)>,
}

impl CleanupReport {
    /// `true` when every release succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Tracks the resources of one request and releases them when the request ends.
pub struct CleanupCoordinator {
    request_id: String,
    state: SessionState,
    surface: Tracked<Box<dyn RenderSurface>>,
    artifact: Tracked<PathBuf>,
    frames: Tracked<FrameStore>,
}

impl CleanupCoordinator {
    /// Start tracking a new request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            state: SessionState::Acquiring,
            surface: Tracked::Vacant,
            artifact: Tracked::Vacant,
            frames: Tracked::Vacant,
        }
    }

    /// Request id used in log events.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn ensure_open(&self, what: &str) -> FadeResult<()> {
        match self.state {
            SessionState::Acquiring | SessionState::Running => Ok(()),
            s => Err(FadeError::from(anyhow::anyhow!(
                "cannot track {what} in state {s:?}"
            ))),
        }
    }

    /// Take ownership of the rendering surface.
    pub fn track_surface(&mut self, surface: Box<dyn RenderSurface>) -> FadeResult<()> {
        self.ensure_open("a surface")?;
        if !self.surface.is_vacant() {
            return Err(anyhow::anyhow!("a surface is already tracked").into());
        }
        self.surface = Tracked::Acquired(surface);
        Ok(())
    }

    /// Take ownership of the frame directory.
    pub fn track_frames(&mut self, frames: FrameStore) -> FadeResult<()> {
        self.ensure_open("a frame directory")?;
        if !self.frames.is_vacant() {
            return Err(anyhow::anyhow!("a frame directory is already tracked").into());
        }
        self.frames = Tracked::Acquired(frames);
        Ok(())
    }

    /// Record the local output path. Call before the file is written so partial output is
    /// removed as well.
    pub fn track_artifact(&mut self, path: impl Into<PathBuf>) -> FadeResult<()> {
        self.ensure_open("an artifact")?;
        if !self.artifact.is_vacant() {
            return Err(anyhow::anyhow!("an artifact is already tracked").into());
        }
        self.artifact = Tracked::Acquired(path.into());
        Ok(())
    }

    /// The tracked surface.
    pub fn surface_mut(&mut self) -> FadeResult<&mut dyn RenderSurface> {
        match self.surface.get_mut() {
            Some(s) => Ok(s.as_mut()),
            None => Err(FadeError::render("no rendering surface is tracked")),
        }
    }

    /// The tracked surface and frame directory, borrowed together for the frame loop.
    pub fn surface_and_frames(&mut self) -> FadeResult<(&mut dyn RenderSurface, &mut FrameStore)> {
        let surface = self
            .surface
            .get_mut()
            .ok_or_else(|| FadeError::render("no rendering surface is tracked"))?;
        let frames = self
            .frames
            .get_mut()
            .ok_or_else(|| FadeError::render("no frame directory is tracked"))?;
        Ok((surface.as_mut(), frames))
    }

    /// The tracked artifact path.
    pub fn artifact_path(&self) -> Option<&Path> {
        match &self.artifact {
            Tracked::Acquired(p) => Some(p.as_path()),
            _ => None,
        }
    }

    /// `Acquiring → Running`.
    pub fn start(&mut self) -> FadeResult<()> {
        self.transition(SessionState::Acquiring, SessionState::Running)
    }

    /// `Running → Succeeded`.
    pub fn succeed(&mut self) -> FadeResult<()> {
        self.transition(SessionState::Running, SessionState::Succeeded)
    }

    /// `Acquiring | Running → Failed`. Failing an already failed session is a no-op.
    pub fn fail(&mut self) {
        match self.state {
            SessionState::Acquiring | SessionState::Running => {
                self.state = SessionState::Failed;
            }
            _ => {}
        }
    }

    fn transition(&mut self, from: SessionState, to: SessionState) -> FadeResult<()> {
        if self.state != from {
            return Err(anyhow::anyhow!(
                "invalid session transition {:?} -> {to:?} (expected {from:?})",
                self.state
            )
            .into());
        }
        self.state = to;
        Ok(())
    }

    /// Release every acquired resource. Sessions that never reached a terminal state count as
    /// failed. Cleaning a `Done` session does nothing and returns an empty report.
    pub fn cleanup(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();
        match self.state {
            SessionState::Done | SessionState::Cleaning => return report,
            SessionState::Acquiring | SessionState::Running => self.fail(),
            SessionState::Succeeded | SessionState::Failed => {}
        }
        let outcome = self.state;
        self.state = SessionState::Cleaning;

        if let Some(mut surface) = self.surface.take() {
            let res = surface.close();
            self.record(&mut report, ResourceKind::Surface, res);
        }
        if let Some(path) = self.artifact.take() {
            let res = remove_file_if_present(&path);
            self.record(&mut report, ResourceKind::Artifact, res);
        }
        if let Some(mut frames) = self.frames.take() {
            let res = frames.remove();
            self.record(&mut report, ResourceKind::FrameDir, res);
        }

        self.state = SessionState::Done;
        tracing::debug!(
            request_id = %self.request_id,
            ?outcome,
            released = report.released.len(),
            failures = report.failures.len(),
            "cleanup finished"
        );
        report
    }

    fn record(&self, report: &mut CleanupReport, kind: ResourceKind, res: FadeResult<()>) {
        match res {
            Ok(()) => {
                tracing::debug!(request_id = %self.request_id, resource = %kind, "released");
                report.released.push(kind);
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %self.request_id,
                    resource = %kind,
                    error = %e,
                    "resource release failed"
                );
                report.failures.push((kind, e.to_string()));
            }
        }
    }
}

impl Drop for CleanupCoordinator {
    fn drop(&mut self) {
        if self.state != SessionState::Done {
            self.cleanup();
        }
    }
}

fn remove_file_if_present(path: &Path) -> FadeResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("failed to remove '{}'", path.display()))
            .into()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/cleanup.rs"]
mod tests;
