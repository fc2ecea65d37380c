//! Error types for the viewer.

use radic_display::DisplayError;
use radic_session::SessionError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ViewerError {
    /// Configuration errors are reported to the user; the rest are bugs or
    /// environment failures.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
