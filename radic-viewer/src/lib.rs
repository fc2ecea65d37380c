//! radic-viewer: a headless shell around one remote session view.
//!
//! The binary wires a [`LoopbackSession`](radic_session::LoopbackSession)
//! to a [`SessionView`] and drives it with the cooperative [`Scheduler`].
//! A windowed shell would replace the scheduler with its own event loop
//! and forward window events to the same view methods.

pub mod args;
pub mod config;
pub mod errors;
pub mod scheduler;
pub mod view;

pub use args::Args;
pub use config::{Config, DisplayConfig};
pub use errors::ViewerError;
pub use scheduler::{RunStats, Scheduler};
pub use view::{SessionView, ShellCommand};
