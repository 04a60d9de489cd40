/// Convenience result alias used across the crate.
pub type StageResult<T> = Result<T, StageError>;

/// Error type for the boundaries of the overlay engine.
///
/// The per-frame paths never return these: access failures degrade and malformed scene data
/// falls back to defaults. Errors surface only when parsing inputs, building raster surfaces or
/// doing tool-level IO.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// Input failed validation (batch JSON, surface sizes, options).
    #[error("validation error: {0}")]
    Validation(String),

    /// The embedded document refused script access (typically cross-origin).
    #[error("access denied: {0}")]
    Access(String),

    /// A transport envelope could not be delivered or decoded.
    #[error("transport error: {0}")]
    Transport(String),

    /// Raster backend failure.
    #[error("render error: {0}")]
    Render(String),

    /// Serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StageError {
    /// Build a [`StageError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StageError::Access`].
    pub fn access(msg: impl Into<String>) -> Self {
        Self::Access(msg.into())
    }

    /// Build a [`StageError::Transport`].
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Build a [`StageError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StageError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for access denials, which callers recover from locally.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Access(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
