//! Error types for display operations.

use thiserror::Error;

/// Errors raised while composing, scaling or exporting frames.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The compositor worker thread could not be started.
    #[error("Failed to spawn compositor thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The pixel format cannot be resampled.
    #[error("Unsupported pixel format for scaling: {0} bits per pixel")]
    UnsupportedFormat(u8),

    /// Pixel buffer operation failed.
    #[error("Buffer error: {0}")]
    Buffer(#[from] anyhow::Error),

    /// Writing an image file failed.
    #[error("Image export failed: {0}")]
    Export(#[from] image::ImageError),
}
