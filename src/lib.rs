//! Fadetitle renders text titles whose letters fade in one after another and fade out together.
//!
//! Two products come out of the same rasterizer:
//!
//! - a transparent VP9/WebM clip (`yuva420p`), rendered frame by frame and encoded by `ffmpeg`,
//! - a single PNG snapshot cropped to the text block.
//!
//! Both are uploaded to object storage. The HTTP surface lives in [`server`]; the per-request
//! lifecycle in [`session`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Letter-stagger opacity timeline.
pub mod animation;
/// Startup configuration.
pub mod config;
/// Frame persistence and video encoding.
pub mod encode;
/// Shared primitives and the crate error type.
pub mod foundation;
/// Text layout and rasterization.
pub mod render;
/// Request payloads.
pub mod scene;
/// HTTP routes.
pub mod server;
/// Request lifecycles and cleanup.
pub mod session;
/// Artifact upload.
pub mod storage;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rect};
pub use crate::foundation::error::{FadeError, FadeResult};

pub use crate::animation::fade::{FadeParams, FadeTimeline, letter_opacity};
pub use crate::config::ServiceConfig;
pub use crate::encode::artifact::{EncodedArtifact, encode_and_verify};
pub use crate::encode::ffmpeg::{
    FfmpegWebmEncoder, FfprobeVerifier, FrameSequence, TransparencyVerifier, VideoEncoder,
};
pub use crate::encode::frame_store::FrameStore;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::backend::{FrameRGBA, RenderSurface, SurfaceFactory};
pub use crate::render::cpu::CpuSurfaceFactory;
pub use crate::render::sequencer::{SequenceStats, sequence_frames};
pub use crate::render::style::TextStyle;
pub use crate::scene::request::{AnimationRequest, SnapshotRequest, SnapshotStyle};
pub use crate::server::ApiServer;
pub use crate::session::{CleanupCoordinator, RenderPipeline, SnapshotOutcome, TitleOutcome};
pub use crate::storage::{InMemoryStore, ObjectStore};
pub use crate::storage::gcs::GcsStore;
