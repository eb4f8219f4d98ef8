//! Request lifecycles: the title and snapshot pipelines and their resource cleanup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::encode::ffmpeg::{TransparencyVerifier, VideoEncoder};
use crate::foundation::core::Fps;
use crate::foundation::error::FadeResult;
use crate::render::backend::SurfaceFactory;
use crate::storage::ObjectStore;

/// Resource state machine of one request.
pub mod cleanup;
/// Static snapshot path.
pub mod snapshot;
/// Animated title path.
pub mod title;

pub use cleanup::{CleanupCoordinator, CleanupReport, ResourceKind, SessionState};
pub use snapshot::SnapshotOutcome;
pub use title::TitleOutcome;

/// Collaborators shared by every request. Cheap to clone.
#[derive(Clone)]
pub struct RenderPipeline {
    surfaces: Arc<dyn SurfaceFactory>,
    encoder: Arc<dyn VideoEncoder>,
    verifier: Arc<dyn TransparencyVerifier>,
    store: Arc<dyn ObjectStore>,
    work_dir: PathBuf,
    fps: Fps,
}

impl RenderPipeline {
    /// Assemble a pipeline writing scratch files under `work_dir`.
    pub fn new(
        surfaces: Arc<dyn SurfaceFactory>,
        encoder: Arc<dyn VideoEncoder>,
        verifier: Arc<dyn TransparencyVerifier>,
        store: Arc<dyn ObjectStore>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            surfaces,
            encoder,
            verifier,
            store,
            work_dir: work_dir.into(),
            fps: Fps::TITLE,
        }
    }

    /// Destination store.
    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Root of per-request scratch files.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn ensure_work_dir(&self) -> FadeResult<()> {
        std::fs::create_dir_all(&self.work_dir).with_context(|| {
            format!(
                "failed to create work directory '{}'",
                self.work_dir.display()
            )
        })?;
        Ok(())
    }
}

/// Run `body` with a fresh coordinator, then release everything it tracked.
///
/// The body's error, if any, is returned unchanged; cleanup failures are only logged.
fn run_tracked<T>(
    request_id: &str,
    body: impl FnOnce(&mut CleanupCoordinator) -> FadeResult<T>,
) -> FadeResult<T> {
    let mut coordinator = CleanupCoordinator::new(request_id);
    let result = body(&mut coordinator);
    if let Err(e) = &result {
        tracing::error!(error = %e, "pipeline failed");
        coordinator.fail();
    }
    let report = coordinator.cleanup();
    if !report.is_clean() {
        tracing::warn!(failures = report.failures.len(), "cleanup left resources behind");
    }
    result
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
