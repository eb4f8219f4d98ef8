/// Frame indices, frame rates and canvas geometry.
pub mod core;
/// The crate error type.
pub mod error;
pub(crate) mod math;
