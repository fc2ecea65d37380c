//! # radic-display: frame composition and presentation
//!
//! Session backends hand complete frames to the [`Compositor`] from any
//! thread. A single worker thread folds each frame's dirty region into the
//! composited buffer and publishes a scaled, ready-to-paint copy. The UI
//! thread paints through a [`DisplaySurface`], which also maps pointer
//! positions back to remote coordinates, and drives a [`ResizeController`]
//! that negotiates the remote desktop size after window resizes settle.
//!
//! ## Example
//!
//! ```rust,no_run
//! use radic_common::{Rect, Size};
//! use radic_display::{CompositorConfig, DisplaySurface};
//! use radic_pixelbuffer::{ManagedPixelBuffer, PixelFormat};
//!
//! # fn example() -> Result<(), radic_display::DisplayError> {
//! let mut surface = DisplaySurface::new(CompositorConfig::default())?;
//! let frames = surface.submitter();
//! let ready = surface.frame_ready();
//!
//! frames.submit(
//!     ManagedPixelBuffer::new(100, 100, PixelFormat::rgb888()),
//!     Rect::default(),
//! );
//! let _ = ready.recv();
//! let scene = surface.render(Size::new(300, 300));
//! scene.save_png("frame.png")?;
//! # Ok(())
//! # }
//! ```

mod compositor;
mod errors;
mod frame;
mod layout;
mod resize;
mod scaling;
mod scene;
mod slot;
mod surface;

pub use compositor::{
    Compositor, CompositorConfig, CompositorStats, FrameReady, FrameSubmitter, Presentable,
};
pub use errors::DisplayError;
pub use frame::Frame;
pub use layout::SurfaceLayout;
pub use resize::{ResizeConfig, ResizeController, ResizeOutcome, ResizeState};
pub use scaling::{scale_buffer, toggled_scale, ScaleFilter};
pub use scene::{Color, DrawOp, Scene};
pub use slot::{FrameSlot, Recv};
pub use surface::{DisplaySurface, FpsCounter};

/// Common result type for display operations
pub type DisplayResult<T> = Result<T, DisplayError>;
