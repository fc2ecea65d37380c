//! Pixel buffer types for the remote display bridge.
//!
//! This crate provides pixel format descriptions and owned frame storage used
//! by the compositor and the display surface.

pub mod buffer;
pub mod format;
pub mod managed;

pub use buffer::{MutablePixelBuffer, PixelBuffer};
pub use format::PixelFormat;
pub use managed::ManagedPixelBuffer;
