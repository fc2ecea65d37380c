//! Behaviour every caller relies on when driving a session through the
//! `RemoteSession` trait object.

use pretty_assertions::assert_eq;
use radic_common::Size;
use radic_session::{
    DesktopMetrics, LoopbackSession, MonitorLayout, Orientation, PointerFlags, RemoteSession,
    SessionCall, SessionError, VirtualKey,
};
use std::sync::atomic::{AtomicU32, Ordering};

/// Accepts input but has no display-control channel.
#[derive(Default)]
struct InputOnly {
    keys: AtomicU32,
}

impl RemoteSession for InputOnly {
    fn send_key_transition(&self, _key: VirtualKey, _pressed: bool, _autorepeat: bool) -> bool {
        self.keys.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn send_pointer_event(&self, _flags: PointerFlags, _x: u16, _y: u16) -> bool {
        true
    }

    fn supports_monitor_layout(&self) -> bool {
        false
    }

    fn send_monitor_layout(&self, _layout: &MonitorLayout) -> Result<(), SessionError> {
        Err(SessionError::LayoutUnsupported)
    }

    fn set_desktop_size(&self, _size: Size) {}
}

#[test]
fn test_default_desktop_metrics() {
    let session: Box<dyn RemoteSession> = Box::new(InputOnly::default());
    assert_eq!(
        session.desktop_metrics(),
        DesktopMetrics {
            orientation: Orientation::Landscape,
            desktop_scale_factor: 100,
            device_scale_factor: 100,
        }
    );
    assert!(!session.supports_monitor_layout());
    assert!(session.send_key_transition(VirtualKey::A, true, false));
}

#[test]
fn test_loopback_through_trait_object() {
    let loopback = LoopbackSession::new(Size::new(640, 480));
    let session: &dyn RemoteSession = &loopback;

    assert!(session.send_key_transition(VirtualKey::RETURN, true, false));
    assert!(session.send_pointer_event(PointerFlags::MOVE, 10, 20));
    let layout = MonitorLayout::single_primary(Size::new(800, 600), &session.desktop_metrics());
    session.send_monitor_layout(&layout).unwrap();
    session.set_desktop_size(Size::new(800, 600));

    assert_eq!(
        loopback.calls(),
        vec![
            SessionCall::Key {
                key: VirtualKey::RETURN,
                pressed: true,
                autorepeat: false
            },
            SessionCall::Pointer {
                flags: PointerFlags::MOVE,
                x: 10,
                y: 20
            },
            SessionCall::MonitorLayout(layout),
            SessionCall::DesktopSize(Size::new(800, 600)),
        ]
    );
    assert_eq!(loopback.desktop_size(), Size::new(800, 600));
}

#[test]
fn test_disconnected_loopback_refuses_everything() {
    let loopback = LoopbackSession::new(Size::new(640, 480));
    loopback.disconnect();
    let session: &dyn RemoteSession = &loopback;

    assert!(!session.send_key_transition(VirtualKey::A, true, false));
    assert!(!session.send_pointer_event(PointerFlags::MOVE, 0, 0));
    assert!(!session.supports_monitor_layout());
    let layout = MonitorLayout::single_primary(Size::new(800, 600), &DesktopMetrics::default());
    assert_eq!(
        session.send_monitor_layout(&layout),
        Err(SessionError::NotConnected)
    );
    assert!(loopback.calls().is_empty());
}
