//! Debounced dynamic-resolution negotiation.
//!
//! Viewport and scale changes arrive in bursts while the user drags a
//! window edge. [`ResizeController::request`] restarts a countdown; only
//! when a full debounce window passes without another request is the new
//! desktop size sent to the session as a single primary monitor layout.

use crate::Compositor;
use radic_common::Size;
use radic_session::{MonitorLayout, MonitorLimits, RemoteSession, SessionError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Dynamic resize settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ticks without a new request before a layout is sent.
    #[serde(default = "default_debounce_ticks")]
    pub debounce_ticks: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub limits: MonitorLimits,
}

fn default_enabled() -> bool {
    true
}

fn default_debounce_ticks() -> u32 {
    50
}

fn default_tick_interval_ms() -> u64 {
    10
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            debounce_ticks: default_debounce_ticks(),
            tick_interval_ms: default_tick_interval_ms(),
            limits: MonitorLimits::default(),
        }
    }
}

impl ResizeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeState {
    Idle,
    /// Ticks left before negotiation.
    Pending(u32),
}

/// What a [`ResizeController::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeOutcome {
    Idle,
    Waiting(u32),
    /// Debounce expired but the target equals the last negotiated size.
    Unchanged(Size),
    Negotiated(Size),
    /// The session has no display-control channel.
    Skipped(Size),
    Failed(SessionError),
}

#[derive(Debug)]
pub struct ResizeController {
    config: ResizeConfig,
    state: ResizeState,
    last_negotiated: Option<Size>,
}

impl ResizeController {
    pub fn new(config: ResizeConfig) -> Self {
        Self {
            config,
            state: ResizeState::Idle,
            last_negotiated: None,
        }
    }

    /// Start or restart the debounce countdown. No-op while disabled.
    pub fn request(&mut self) {
        if !self.config.enabled {
            return;
        }
        let ticks = self.config.debounce_ticks.max(1);
        if let ResizeState::Pending(_) = self.state {
            debug!("Resize request restarts debounce");
        }
        self.state = ResizeState::Pending(ticks);
    }

    pub fn cancel(&mut self) {
        self.state = ResizeState::Idle;
    }

    /// Toggle dynamic resolution. Enabling requests a resize.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.config.enabled == enabled {
            return;
        }
        info!(
            "Dynamic resize {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.config.enabled = enabled;
        if enabled {
            self.request();
        } else {
            self.cancel();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn state(&self) -> ResizeState {
        self.state
    }

    pub fn last_negotiated(&self) -> Option<Size> {
        self.last_negotiated
    }

    pub fn config(&self) -> &ResizeConfig {
        &self.config
    }

    /// Desktop size for a viewport at the given scale, within the limits.
    pub fn target_size(&self, viewport: Size, scale: u32) -> Size {
        self.config.limits.clamp(viewport.divided_by(scale))
    }

    /// Advance the countdown by one tick and negotiate when it expires.
    pub fn tick(
        &mut self,
        viewport: Size,
        scale: u32,
        session: &dyn RemoteSession,
        compositor: &Compositor,
    ) -> ResizeOutcome {
        let remaining = match self.state {
            ResizeState::Idle => return ResizeOutcome::Idle,
            ResizeState::Pending(n) => n.saturating_sub(1),
        };
        if remaining > 0 {
            self.state = ResizeState::Pending(remaining);
            return ResizeOutcome::Waiting(remaining);
        }
        self.state = ResizeState::Idle;

        let target = self.target_size(viewport, scale);
        if self.last_negotiated == Some(target) {
            debug!("Desktop already at {}", target);
            return ResizeOutcome::Unchanged(target);
        }
        if !session.supports_monitor_layout() {
            debug!("Session has no monitor layout support, not resizing to {}", target);
            return ResizeOutcome::Skipped(target);
        }

        let layout = MonitorLayout::single_primary(target, &session.desktop_metrics());
        if let Err(e) = session.send_monitor_layout(&layout) {
            warn!("Monitor layout {} rejected: {}", target, e);
            return ResizeOutcome::Failed(e);
        }
        session.set_desktop_size(target);
        compositor.resize_buffers(target);
        self.last_negotiated = Some(target);
        info!("Negotiated desktop size {}", target);
        ResizeOutcome::Negotiated(target)
    }
}

impl Default for ResizeController {
    fn default() -> Self {
        Self::new(ResizeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompositorConfig;
    use pretty_assertions::assert_eq;
    use radic_session::LoopbackSession;

    fn controller(ticks: u32) -> ResizeController {
        ResizeController::new(ResizeConfig {
            debounce_ticks: ticks,
            ..ResizeConfig::default()
        })
    }

    fn session() -> LoopbackSession {
        let session = LoopbackSession::new(Size::new(1024, 768));
        session.set_layout_supported(true);
        session
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let mut resize = controller(3);
        let outcome = resize.tick(Size::new(800, 600), 1, &session(), &compositor);
        assert_eq!(outcome, ResizeOutcome::Idle);
    }

    #[test]
    fn test_negotiates_after_debounce() {
        let compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let session = session();
        let mut resize = controller(3);
        resize.request();

        let viewport = Size::new(800, 600);
        assert_eq!(resize.tick(viewport, 1, &session, &compositor), ResizeOutcome::Waiting(2));
        assert_eq!(resize.tick(viewport, 1, &session, &compositor), ResizeOutcome::Waiting(1));
        assert_eq!(
            resize.tick(viewport, 1, &session, &compositor),
            ResizeOutcome::Negotiated(Size::new(800, 600))
        );
        assert_eq!(resize.state(), ResizeState::Idle);

        let layouts = session.layouts();
        assert_eq!(layouts.len(), 1);
        assert_eq!(layouts[0].size(), Size::new(800, 600));
        assert_eq!(layouts[0].left, 0);
        assert_eq!(session.desktop_size(), Size::new(800, 600));
    }

    #[test]
    fn test_target_is_divided_and_clamped() {
        let resize = controller(1);
        assert_eq!(resize.target_size(Size::new(800, 600), 2), Size::new(400, 300));
        assert_eq!(resize.target_size(Size::new(300, 100), 1), Size::new(300, 200));
        assert_eq!(resize.target_size(Size::new(20000, 50), 1), Size::new(8192, 200));
    }

    #[test]
    fn test_same_size_is_not_renegotiated() {
        let compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let session = session();
        let mut resize = controller(1);
        let viewport = Size::new(640, 480);

        resize.request();
        resize.tick(viewport, 1, &session, &compositor);
        resize.request();
        assert_eq!(
            resize.tick(viewport, 1, &session, &compositor),
            ResizeOutcome::Unchanged(viewport)
        );
        assert_eq!(session.layouts().len(), 1);
    }

    #[test]
    fn test_skipped_without_layout_support() {
        let compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let session = LoopbackSession::new(Size::new(1024, 768));
        session.set_layout_supported(false);
        let mut resize = controller(1);
        resize.request();
        assert_eq!(
            resize.tick(Size::new(100, 100), 1, &session, &compositor),
            ResizeOutcome::Skipped(Size::new(200, 200))
        );
        assert!(session.layouts().is_empty());
        assert_eq!(resize.last_negotiated(), None);
    }

    #[test]
    fn test_rejected_layout_is_not_recorded() {
        let compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let session = session();
        session.reject_layouts(Some("busy"));
        let mut resize = controller(1);
        resize.request();
        let outcome = resize.tick(Size::new(640, 480), 1, &session, &compositor);
        assert!(matches!(outcome, ResizeOutcome::Failed(SessionError::Rejected(_))));
        assert_eq!(resize.last_negotiated(), None);
        assert_eq!(session.desktop_size(), Size::new(1024, 768));
    }

    #[test]
    fn test_disabled_ignores_requests() {
        let mut resize = controller(5);
        resize.set_enabled(false);
        resize.request();
        assert_eq!(resize.state(), ResizeState::Idle);
        resize.set_enabled(true);
        assert_eq!(resize.state(), ResizeState::Pending(5));
    }
}
