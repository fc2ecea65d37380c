//! The per-session view the UI shell talks to.
//!
//! A [`SessionView`] ties one remote session to its display surface, input
//! queue and resize controller. The shell feeds it window events and asks
//! it for scenes; everything it owns is driven from the UI thread.

use crate::config::Config;
use crate::errors::ViewerError;
use radic_common::{Point, Rect, Size};
use radic_display::{
    toggled_scale, CompositorStats, DisplaySurface, FrameReady, ResizeController, ResizeOutcome,
    Scene,
};
use radic_input::{
    pointer_flags, InputDispatcher, KeyEvent, KeyOutcome, KeyRouter, PointerEventKind,
    ShortcutAction,
};
use radic_pixelbuffer::{ManagedPixelBuffer, PixelFormat};
use radic_session::{RemoteSession, SessionContext, SessionEvent, ViewId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Requests the shell has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    ToggleCommandSurface,
    ToggleFullscreen,
}

pub struct SessionView {
    id: ViewId,
    session: Arc<dyn RemoteSession>,
    surface: DisplaySurface,
    dispatcher: InputDispatcher,
    router: KeyRouter,
    resize: ResizeController,
    viewport: Size,
    /// Last desktop size reported by the session.
    desktop_size: Option<Size>,
    events_tx: flume::Sender<SessionEvent>,
    events: flume::Receiver<SessionEvent>,
    connected: bool,
    interrupted: Arc<AtomicBool>,
}

impl SessionView {
    pub fn new(
        id: ViewId,
        session: Arc<dyn RemoteSession>,
        config: &Config,
    ) -> Result<Self, ViewerError> {
        config.validate()?;
        let mut surface = DisplaySurface::new(config.display.compositor())?;
        surface.set_fps_overlay(config.display.fps_overlay);
        let (events_tx, events) = flume::unbounded();
        let viewport = config.display.viewport();
        surface.layout(viewport);

        info!("{}: view created ({} viewport)", id, viewport);
        Ok(Self {
            id,
            session,
            surface,
            dispatcher: InputDispatcher::new(),
            router: KeyRouter::new(config.input.clone()),
            resize: ResizeController::new(config.resize.clone()),
            viewport,
            desktop_size: None,
            events_tx,
            events,
            connected: false,
            interrupted: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Context for the session's event pump: frames go to this view's
    /// compositor, lifecycle events to its queue.
    pub fn session_context(&self) -> SessionContext {
        SessionContext::new(
            self.id,
            Arc::new(self.surface.submitter()),
            self.events_tx.clone(),
        )
    }

    pub fn frame_ready(&self) -> flume::Receiver<FrameReady> {
        self.surface.frame_ready()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn scale(&self) -> u32 {
        self.surface.scale()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Shared flag other threads can poll to notice shutdown.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    pub fn stats(&self) -> CompositorStats {
        self.surface.compositor().stats()
    }

    /// Paint the current frame for `viewport`. A new viewport size counts
    /// as a resize.
    pub fn render(&mut self, viewport: Size) -> Scene {
        if viewport != self.viewport {
            self.on_viewport_resized(viewport);
        }
        self.surface.render(viewport)
    }

    /// Translate a pointer event at viewport position `pos` and send it.
    ///
    /// Returns `false` when nothing was sent.
    pub fn on_pointer_event(&mut self, kind: PointerEventKind, pos: Point) -> bool {
        if self.is_interrupted() || !self.connected {
            return false;
        }
        let Some(flags) = pointer_flags(kind) else {
            return false;
        };
        let remote = self.surface.map_point_to_remote(pos);
        let frame = self.surface.current_layout().frame;
        let x = clamp_coord(remote.x, frame.width);
        let y = clamp_coord(remote.y, frame.height);
        trace!("{}: pointer {:?} at {},{}", self.id, flags, x, y);
        self.session.send_pointer_event(flags, x, y)
    }

    /// Route a key event. Shell shortcuts come back as a [`ShellCommand`];
    /// the scale toggle is handled here.
    pub fn on_key_event(&mut self, event: KeyEvent) -> Option<ShellCommand> {
        if self.is_interrupted() {
            return None;
        }
        match self.router.route(&event, &mut self.dispatcher) {
            KeyOutcome::Shortcut(ShortcutAction::ToggleScale) => {
                self.toggle_scale();
                None
            }
            KeyOutcome::Shortcut(ShortcutAction::ToggleFullscreen) => {
                Some(ShellCommand::ToggleFullscreen)
            }
            KeyOutcome::Shortcut(ShortcutAction::ToggleCommandSurface) => {
                Some(ShellCommand::ToggleCommandSurface)
            }
            _ => None,
        }
    }

    pub fn on_viewport_resized(&mut self, viewport: Size) {
        if self.is_interrupted() || viewport == self.viewport {
            return;
        }
        debug!("{}: viewport {} -> {}", self.id, self.viewport, viewport);
        self.viewport = viewport;
        self.surface.layout(viewport);
        self.resize.request();
    }

    pub fn on_scale_changed(&mut self, scale: u32) {
        if self.is_interrupted() {
            return;
        }
        self.surface.set_scale(scale);
        self.resize.request();
    }

    pub fn toggle_scale(&mut self) {
        let scale = toggled_scale(self.surface.scale());
        info!("{}: scale -> {}", self.id, scale);
        self.on_scale_changed(scale);
    }

    pub fn set_dynamic_resize(&mut self, enabled: bool) {
        self.resize.set_enabled(enabled);
    }

    /// One scheduler tick: apply session events, send one key chunk and
    /// advance the resize debounce.
    pub fn tick(&mut self) -> ResizeOutcome {
        if self.is_interrupted() {
            return ResizeOutcome::Idle;
        }
        self.process_events();
        if !self.connected {
            return ResizeOutcome::Idle;
        }
        self.dispatcher.tick(self.session.as_ref());
        self.resize.tick(
            self.viewport,
            self.surface.scale(),
            self.session.as_ref(),
            self.surface.compositor(),
        )
    }

    /// Latch the fps counter; call once per second.
    pub fn tick_fps(&mut self) -> u32 {
        self.surface.tick_fps()
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::Connected { size } => {
                    info!("{}: connected, desktop {}", self.id, size);
                    if self.dispatcher.is_closed() {
                        self.dispatcher.reopen();
                        self.router.reset();
                    }
                    self.connected = true;
                    self.desktop_size = Some(size);
                    self.resize.request();
                }
                SessionEvent::MonitorLayoutReady => {
                    debug!("{}: monitor layout channel ready", self.id);
                    self.resize.request();
                }
                SessionEvent::DesktopResized { size } => {
                    debug!("{}: desktop resized to {}", self.id, size);
                    self.desktop_size = Some(size);
                    self.surface.compositor().resize_buffers(size);
                }
                SessionEvent::Disconnected { reason } => {
                    info!(
                        "{}: session disconnected{}",
                        self.id,
                        reason.map(|r| format!(": {}", r)).unwrap_or_default()
                    );
                    self.disconnect();
                }
            }
        }
    }

    /// Stop sending input and replace the picture with a black frame of the
    /// last known size. The view keeps rendering.
    pub fn disconnect(&mut self) {
        if !self.connected && self.dispatcher.is_closed() {
            return;
        }
        self.connected = false;
        self.dispatcher.close();
        self.resize.cancel();

        let size = self
            .surface
            .compositor()
            .snapshot()
            .map(|p| p.frame_size)
            .or(self.desktop_size);
        if let Some(size) = size.filter(|s| !s.is_empty()) {
            debug!("{}: blanking {} frame", self.id, size);
            let black = ManagedPixelBuffer::new(size.width, size.height, PixelFormat::rgb888());
            self.surface.submitter().submit(black, Rect::default());
        }
    }

    /// Stop the compositor. Idempotent; also run on drop.
    pub fn shutdown(&mut self) {
        if self.interrupted.swap(true, Ordering::SeqCst) {
            return;
        }
        self.dispatcher.close();
        self.resize.cancel();
        self.surface.shutdown();
        info!("{}: view shut down", self.id);
    }
}

impl Drop for SessionView {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Clamp a remote coordinate into `0..extent` (or `0..=u16::MAX` while the
/// extent is unknown).
fn clamp_coord(v: i32, extent: u32) -> u16 {
    let max = if extent == 0 {
        u16::MAX as i32
    } else {
        (extent.min(u16::MAX as u32 + 1) - 1) as i32
    };
    v.clamp(0, max) as u16
}
