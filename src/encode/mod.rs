//! Frame persistence, video encoding and alpha verification.

/// Encoded container metadata and the encode-then-probe step.
pub mod artifact;
/// `ffmpeg`/`ffprobe` process wrappers.
pub mod ffmpeg;
/// On-disk frame directories.
pub mod frame_store;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
