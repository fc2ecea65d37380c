//! Typed context handed to a session's event pump.
//!
//! Instead of recovering the owning view from an opaque pointer, the pump
//! gets a [`SessionContext`] holding the frame sink and the event channel
//! of exactly one view.

use radic_common::{Rect, Size};
use radic_pixelbuffer::ManagedPixelBuffer;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Identifies the view a session context belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Receiver of decoded frames. Called from the session's own thread.
pub trait FrameSink: Send + Sync {
    /// Hand over a complete frame. `dirty` marks the region that changed
    /// since the previous frame; an empty rectangle means the whole frame.
    fn submit_frame(&self, buffer: ManagedPixelBuffer, dirty: Rect);
}

/// Lifecycle notifications from the session's event pump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected { size: Size },
    /// The display-control channel is ready; monitor layouts may be sent.
    MonitorLayoutReady,
    DesktopResized { size: Size },
    Disconnected { reason: Option<String> },
}

/// Everything an event pump needs to report back to its view.
#[derive(Clone)]
pub struct SessionContext {
    owner: ViewId,
    frames: Arc<dyn FrameSink>,
    events: flume::Sender<SessionEvent>,
}

impl SessionContext {
    pub fn new(
        owner: ViewId,
        frames: Arc<dyn FrameSink>,
        events: flume::Sender<SessionEvent>,
    ) -> Self {
        Self {
            owner,
            frames,
            events,
        }
    }

    pub fn owner(&self) -> ViewId {
        self.owner
    }

    /// Forward a frame to the owning view's compositor.
    pub fn submit_frame(&self, buffer: ManagedPixelBuffer, dirty: Rect) {
        self.frames.submit_frame(buffer, dirty);
    }

    /// Emit a lifecycle event. Returns `false` once the view has gone away.
    pub fn emit(&self, event: SessionEvent) -> bool {
        trace!("{} <- {:?}", self.owner, event);
        self.events.send(event).is_ok()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use radic_pixelbuffer::PixelFormat;

    #[derive(Default)]
    struct CountingSink(Mutex<Vec<Rect>>);

    impl FrameSink for CountingSink {
        fn submit_frame(&self, _buffer: ManagedPixelBuffer, dirty: Rect) {
            self.0.lock().push(dirty);
        }
    }

    #[test]
    fn test_context_routes_to_owner() {
        let sink = Arc::new(CountingSink::default());
        let (tx, rx) = flume::unbounded();
        let ctx = SessionContext::new(ViewId(7), sink.clone(), tx);

        ctx.submit_frame(
            ManagedPixelBuffer::new(4, 4, PixelFormat::rgb888()),
            Rect::new(0, 0, 2, 2),
        );
        assert!(ctx.emit(SessionEvent::MonitorLayoutReady));

        assert_eq!(ctx.owner(), ViewId(7));
        assert_eq!(*sink.0.lock(), vec![Rect::new(0, 0, 2, 2)]);
        assert_eq!(rx.try_recv(), Ok(SessionEvent::MonitorLayoutReady));

        drop(rx);
        assert!(!ctx.emit(SessionEvent::Disconnected { reason: None }));
    }
}
