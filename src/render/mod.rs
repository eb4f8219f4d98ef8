//! Rasterization: text style, layout, the CPU surface and the frame loop.

/// Frame buffers and the surface traits.
pub mod backend;
pub(crate) mod blur;
/// CSS-like color parsing.
pub mod color;
/// `vello_cpu` surfaces.
pub mod cpu;
/// The per-request frame loop.
pub mod sequencer;
/// Resolved text styles and style-string parsers.
pub mod style;
pub(crate) mod text;
