/// Convenience result alias used across the crate.
pub type FadeResult<T> = Result<T, FadeError>;

/// Error categories surfaced by the render pipeline and its collaborators.
///
/// The display prefix of each variant is stable and forms part of the `details` field returned
/// to HTTP callers.
#[derive(thiserror::Error, Debug)]
pub enum FadeError {
    /// Missing or ill-typed request fields, violated request invariants.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rendering surface, style or rasterization failure.
    #[error("render error: {0}")]
    Render(String),

    /// Encoder or verifier process failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Object storage failure.
    #[error("upload error: {0}")]
    Upload(String),

    /// Startup misconfiguration.
    #[error("config error: {0}")]
    Config(String),

    /// Anything else, usually I/O with an attached context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FadeError {
    /// Build a [`FadeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FadeError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FadeError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FadeError::Upload`].
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Build a [`FadeError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status code for this error at the request boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            _ => 500,
        }
    }
}
