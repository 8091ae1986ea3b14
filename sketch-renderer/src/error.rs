//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Rasterizing or encoding an export failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Image data could not be decoded.
    #[error("Failed to load image: {0}")]
    Image(String),
}
