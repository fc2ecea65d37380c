//! Remote session contract for the display bridge.
//!
//! The protocol engine that talks to a remote desktop lives behind the
//! [`RemoteSession`] trait. Everything the bridge needs from it is here:
//!
//! - outbound input: key transitions and pointer events
//! - display control: monitor layout and desktop size negotiation
//! - inbound frames: the engine's event pump receives a [`SessionContext`]
//!   and pushes frames into its [`FrameSink`]
//!
//! [`LoopbackSession`] is an in-process implementation that records every
//! outbound call and can run a test-pattern event pump; the viewer binary
//! and the test suites drive the bridge with it.
//!
//! # Example
//!
//! ```
//! use radic_common::Size;
//! use radic_session::{LoopbackSession, RemoteSession, SessionCall, VirtualKey};
//!
//! let session = LoopbackSession::new(Size::new(800, 600));
//! assert!(session.send_key_transition(VirtualKey::RETURN, true, false));
//! assert_eq!(
//!     session.calls(),
//!     vec![SessionCall::Key { key: VirtualKey::RETURN, pressed: true, autorepeat: false }]
//! );
//! ```

#![forbid(unsafe_code)]

mod context;
mod errors;
mod keys;
mod loopback;
mod messages;

pub use context::{FrameSink, SessionContext, SessionEvent, ViewId};
pub use errors::SessionError;
pub use keys::VirtualKey;
pub use loopback::{LoopbackSession, PumpConfig, SessionCall};
pub use messages::{
    DesktopMetrics, MonitorFlags, MonitorLayout, MonitorLimits, Orientation, PointerFlags,
};

use radic_common::Size;

/// Capabilities the bridge requires from a remote session.
///
/// Implementations are shared between the UI thread (input, resize) and
/// whatever threads the engine runs, so every method takes `&self`.
pub trait RemoteSession: Send + Sync {
    /// Send one key transition. Returns `false` when the session refused it.
    fn send_key_transition(&self, key: VirtualKey, pressed: bool, autorepeat: bool) -> bool;

    /// Send one pointer event at remote coordinates.
    fn send_pointer_event(&self, flags: PointerFlags, x: u16, y: u16) -> bool;

    /// Whether the display-control channel is up and accepts monitor layouts.
    fn supports_monitor_layout(&self) -> bool;

    /// Ask the remote side to adopt a monitor layout. `Ok` means the request
    /// was acknowledged and the desktop will be resized.
    fn send_monitor_layout(&self, layout: &MonitorLayout) -> Result<(), SessionError>;

    /// Record the negotiated desktop size in the session settings.
    fn set_desktop_size(&self, size: Size);

    /// Orientation and scale factors to advertise with monitor layouts.
    fn desktop_metrics(&self) -> DesktopMetrics {
        DesktopMetrics::default()
    }
}
