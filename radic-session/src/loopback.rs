//! In-process remote session.
//!
//! [`LoopbackSession`] records every outbound call and, when started, runs
//! an event pump thread that paints a moving test pattern into the owning
//! view's frame sink. Monitor layouts are acknowledged immediately and the
//! pump follows the negotiated desktop size on its next frame.

use crate::{
    MonitorLayout, PointerFlags, RemoteSession, SessionContext, SessionError, SessionEvent,
    VirtualKey,
};
use parking_lot::Mutex;
use radic_common::{Rect, Size};
use radic_pixelbuffer::{ManagedPixelBuffer, MutablePixelBuffer, PixelFormat};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Key {
        key: VirtualKey,
        pressed: bool,
        autorepeat: bool,
    },
    Pointer {
        flags: PointerFlags,
        x: u16,
        y: u16,
    },
    MonitorLayout(MonitorLayout),
    DesktopSize(Size),
}

/// Event pump settings.
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Frames generated per second.
    pub fps: u32,
    /// Edge length of the moving marker square.
    pub marker_size: u32,
    pub format: PixelFormat,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            marker_size: 32,
            format: PixelFormat::rgb888(),
        }
    }
}

const BACKGROUND: [u8; 4] = [0, 43, 54, 255];
const MARKER: [u8; 4] = [203, 75, 22, 255];

struct Pump {
    stop: flume::Sender<()>,
    handle: JoinHandle<()>,
}

/// Remote session that loops everything back into the process.
pub struct LoopbackSession {
    calls: Mutex<Vec<SessionCall>>,
    desktop_size: Mutex<Size>,
    connected: AtomicBool,
    layout_supported: AtomicBool,
    rejected_layout: Mutex<Option<String>>,
    pump: Mutex<Option<Pump>>,
}

impl LoopbackSession {
    /// A connected session with monitor-layout support.
    pub fn new(desktop_size: Size) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            desktop_size: Mutex::new(desktop_size),
            connected: AtomicBool::new(true),
            layout_supported: AtomicBool::new(true),
            rejected_layout: Mutex::new(None),
            pump: Mutex::new(None),
        }
    }

    /// Toggle whether the display-control channel is available.
    pub fn set_layout_supported(&self, supported: bool) {
        self.layout_supported.store(supported, Ordering::SeqCst);
    }

    /// Make every later layout request fail with `reason`; `None` accepts again.
    pub fn reject_layouts(&self, reason: Option<&str>) {
        *self.rejected_layout.lock() = reason.map(str::to_string);
    }

    /// While disconnected all sends are refused.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn desktop_size(&self) -> Size {
        *self.desktop_size.lock()
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().clone()
    }

    /// Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<SessionCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Recorded key transitions as `(key, pressed)` pairs.
    pub fn key_transitions(&self) -> Vec<(VirtualKey, bool)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SessionCall::Key { key, pressed, .. } => Some((*key, *pressed)),
                _ => None,
            })
            .collect()
    }

    /// Recorded monitor layouts.
    pub fn layouts(&self) -> Vec<MonitorLayout> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SessionCall::MonitorLayout(layout) => Some(layout.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: SessionCall) {
        self.calls.lock().push(call);
    }

    /// Start the event pump for `ctx`. A running pump is stopped first.
    pub fn start(self: &Arc<Self>, ctx: SessionContext, config: PumpConfig) -> std::io::Result<()> {
        self.stop();
        self.set_connected(true);

        let (stop_tx, stop_rx) = flume::bounded(1);
        let session = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("loopback-pump-{}", ctx.owner().0))
            .spawn(move || session.run_pump(ctx, config, stop_rx))?;

        *self.pump.lock() = Some(Pump {
            stop: stop_tx,
            handle,
        });
        Ok(())
    }

    /// Stop the event pump and wait for it to exit.
    pub fn stop(&self) {
        let pump = self.pump.lock().take();
        if let Some(pump) = pump {
            let _ = pump.stop.try_send(());
            if pump.handle.join().is_err() {
                warn!("Loopback pump thread panicked");
            }
        }
    }

    /// Stop the pump and refuse further sends.
    pub fn disconnect(&self) {
        self.stop();
        self.set_connected(false);
    }

    fn run_pump(&self, ctx: SessionContext, config: PumpConfig, stop: flume::Receiver<()>) {
        let interval = Duration::from_millis(1000 / config.fps.max(1) as u64);
        let mut size = self.desktop_size();
        let mut canvas = ManagedPixelBuffer::filled(size.width, size.height, config.format, BACKGROUND);
        let background = config.format.from_rgb888(BACKGROUND);
        let marker = config.format.from_rgb888(MARKER);
        let mut previous: Option<Rect> = None;
        let mut whole = true;
        let mut tick: u64 = 0;

        info!("{}: loopback session connected at {}", ctx.owner(), size);
        ctx.emit(SessionEvent::Connected { size });
        if self.layout_supported.load(Ordering::SeqCst) {
            ctx.emit(SessionEvent::MonitorLayoutReady);
        }

        loop {
            let negotiated = self.desktop_size();
            if negotiated != size {
                debug!("{}: pump resizing {} -> {}", ctx.owner(), size, negotiated);
                size = negotiated;
                canvas = ManagedPixelBuffer::filled(size.width, size.height, config.format, BACKGROUND);
                previous = None;
                whole = true;
                ctx.emit(SessionEvent::DesktopResized { size });
            }

            let bounds = Rect::from_size(size);
            let mut changed = Rect::default();
            if let Some(old) = previous.take() {
                if canvas.fill_rect(old, &background).is_ok() {
                    changed = changed.union(&old);
                }
            }
            if let Some(current) = marker_rect(size, config.marker_size, tick).intersect(&bounds) {
                if canvas.fill_rect(current, &marker).is_ok() {
                    changed = changed.union(&current);
                    previous = Some(current);
                }
            }

            if whole || !changed.is_empty() {
                // An empty dirty rectangle marks the whole frame.
                let dirty = if whole { Rect::default() } else { changed };
                trace!("{}: frame {} dirty {:?}", ctx.owner(), tick, dirty);
                ctx.submit_frame(canvas.clone(), dirty);
                whole = false;
            }
            tick += 1;

            match stop.recv_timeout(interval) {
                Err(flume::RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(flume::RecvTimeoutError::Disconnected) => break,
            }
        }

        ctx.emit(SessionEvent::Disconnected { reason: None });
        info!("{}: loopback pump stopped after {} frames", ctx.owner(), tick);
    }
}

/// Marker position sweeping diagonally across the desktop.
fn marker_rect(size: Size, edge: u32, tick: u64) -> Rect {
    let span_x = size.width.saturating_sub(edge).max(1) as u64;
    let span_y = size.height.saturating_sub(edge).max(1) as u64;
    let step = tick * 4;
    Rect::new(
        (step % span_x) as i32,
        ((step / 2) % span_y) as i32,
        edge,
        edge,
    )
}

impl RemoteSession for LoopbackSession {
    fn send_key_transition(&self, key: VirtualKey, pressed: bool, autorepeat: bool) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.record(SessionCall::Key {
            key,
            pressed,
            autorepeat,
        });
        true
    }

    fn send_pointer_event(&self, flags: PointerFlags, x: u16, y: u16) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.record(SessionCall::Pointer { flags, x, y });
        true
    }

    fn supports_monitor_layout(&self) -> bool {
        self.is_connected() && self.layout_supported.load(Ordering::SeqCst)
    }

    fn send_monitor_layout(&self, layout: &MonitorLayout) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        if !self.layout_supported.load(Ordering::SeqCst) {
            return Err(SessionError::LayoutUnsupported);
        }
        if let Some(reason) = self.rejected_layout.lock().clone() {
            return Err(SessionError::Rejected(reason));
        }
        self.record(SessionCall::MonitorLayout(layout.clone()));
        Ok(())
    }

    fn set_desktop_size(&self, size: Size) {
        self.record(SessionCall::DesktopSize(size));
        *self.desktop_size.lock() = size;
    }
}

impl Drop for LoopbackSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DesktopMetrics, FrameSink, ViewId};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Frames(Mutex<Vec<(Size, Rect)>>);

    impl FrameSink for Frames {
        fn submit_frame(&self, buffer: ManagedPixelBuffer, dirty: Rect) {
            self.0.lock().push((buffer.size(), dirty));
        }
    }

    #[test]
    fn test_records_calls_in_order() {
        let session = LoopbackSession::new(Size::new(640, 480));
        assert!(session.send_key_transition(VirtualKey::A, true, false));
        assert!(session.send_pointer_event(PointerFlags::MOVE, 3, 4));
        session.set_desktop_size(Size::new(800, 600));

        assert_eq!(
            session.take_calls(),
            vec![
                SessionCall::Key {
                    key: VirtualKey::A,
                    pressed: true,
                    autorepeat: false
                },
                SessionCall::Pointer {
                    flags: PointerFlags::MOVE,
                    x: 3,
                    y: 4
                },
                SessionCall::DesktopSize(Size::new(800, 600)),
            ]
        );
        assert!(session.calls().is_empty());
        assert_eq!(session.desktop_size(), Size::new(800, 600));
    }

    #[test]
    fn test_disconnected_refuses_sends() {
        let session = LoopbackSession::new(Size::new(640, 480));
        session.set_connected(false);
        assert!(!session.send_key_transition(VirtualKey::A, true, false));
        assert!(!session.send_pointer_event(PointerFlags::MOVE, 0, 0));
        assert!(!session.supports_monitor_layout());
        assert!(session.calls().is_empty());
    }

    #[test]
    fn test_layout_support_and_rejection() {
        let session = LoopbackSession::new(Size::new(640, 480));
        let layout = MonitorLayout::single_primary(Size::new(1024, 768), &DesktopMetrics::default());

        session.set_layout_supported(false);
        assert_eq!(
            session.send_monitor_layout(&layout),
            Err(SessionError::LayoutUnsupported)
        );

        session.set_layout_supported(true);
        session.reject_layouts(Some("busy"));
        assert_eq!(
            session.send_monitor_layout(&layout),
            Err(SessionError::Rejected("busy".to_string()))
        );

        session.reject_layouts(None);
        assert_eq!(session.send_monitor_layout(&layout), Ok(()));
        assert_eq!(session.layouts(), vec![layout]);
    }

    #[test]
    fn test_pump_emits_frames_and_events() {
        let session = Arc::new(LoopbackSession::new(Size::new(320, 240)));
        let frames = Arc::new(Frames::default());
        let (tx, rx) = flume::unbounded();
        let ctx = SessionContext::new(ViewId(1), frames.clone(), tx);

        session
            .start(
                ctx,
                PumpConfig {
                    fps: 200,
                    ..PumpConfig::default()
                },
            )
            .unwrap();
        std::thread::sleep(Duration::from_millis(60));
        session.stop();

        let frames = frames.0.lock().clone();
        assert!(frames.len() >= 2, "expected several frames, got {}", frames.len());
        assert_eq!(frames[0], (Size::new(320, 240), Rect::default()));
        for (size, dirty) in &frames[1..] {
            assert_eq!(*size, Size::new(320, 240));
            assert!(Rect::from_size(*size).contains_rect(dirty));
        }

        let events: Vec<_> = rx.drain().collect();
        assert_eq!(
            events.first(),
            Some(&SessionEvent::Connected {
                size: Size::new(320, 240)
            })
        );
        assert_eq!(
            events.last(),
            Some(&SessionEvent::Disconnected { reason: None })
        );
    }

    #[test]
    fn test_marker_stays_inside_desktop() {
        let size = Size::new(100, 60);
        for tick in 0..500 {
            let r = marker_rect(size, 16, tick);
            assert!(Rect::from_size(size).contains_rect(&r), "tick {tick}: {r:?}");
        }
    }
}
