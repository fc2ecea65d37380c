//! Cooperative single-threaded driver for a [`SessionView`].
//!
//! Stands in for a UI event loop: it repaints when the compositor signals
//! a new frame, runs the view tick on a fixed interval and latches the fps
//! counter once a second. Nothing fires after the view is interrupted.

use crate::view::SessionView;
use radic_common::Size;
use radic_display::{ResizeOutcome, Scene};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

const FPS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct RunStats {
    pub renders: u64,
    pub ticks: u64,
    /// One entry per elapsed second.
    pub fps_samples: Vec<u32>,
    /// Desktop sizes negotiated during the run, in order.
    pub negotiated: Vec<Size>,
    pub last_scene: Option<Scene>,
}

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    tick_interval: Duration,
    fps_interval: Duration,
}

impl Scheduler {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            fps_interval: FPS_INTERVAL,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Drive `view` for `duration` or until it is interrupted.
    pub fn run_for(&self, view: &mut SessionView, duration: Duration) -> RunStats {
        self.run_until(view, duration, |_| false)
    }

    /// Like [`run_for`](Self::run_for), but also stops as soon as `done`
    /// returns true. `done` is checked after every tick.
    pub fn run_until<F>(&self, view: &mut SessionView, duration: Duration, mut done: F) -> RunStats
    where
        F: FnMut(&RunStats) -> bool,
    {
        let ready = view.frame_ready();
        let start = Instant::now();
        let end = start + duration;
        let mut next_tick = start + self.tick_interval;
        let mut next_fps = start + self.fps_interval;
        let mut stats = RunStats::default();

        loop {
            if view.is_interrupted() {
                debug!("{}: scheduler stopped, view interrupted", view.id());
                break;
            }
            let now = Instant::now();
            if now >= end {
                break;
            }

            let deadline = next_tick.min(next_fps).min(end);
            match ready.recv_deadline(deadline) {
                Ok(frame) => {
                    if view.is_interrupted() {
                        break;
                    }
                    trace!("{}: repaint for generation {}", view.id(), frame.generation);
                    let viewport = view.viewport();
                    stats.last_scene = Some(view.render(viewport));
                    stats.renders += 1;
                }
                Err(flume::RecvTimeoutError::Timeout) => {}
                Err(flume::RecvTimeoutError::Disconnected) => {
                    warn!("{}: compositor went away", view.id());
                    break;
                }
            }

            let now = Instant::now();
            if now >= next_tick && !view.is_interrupted() {
                match view.tick() {
                    ResizeOutcome::Negotiated(size) => stats.negotiated.push(size),
                    ResizeOutcome::Failed(e) => warn!("{}: resize failed: {}", view.id(), e),
                    _ => {}
                }
                stats.ticks += 1;
                next_tick += self.tick_interval;
                if next_tick < now {
                    next_tick = now + self.tick_interval;
                }
                if done(&stats) {
                    break;
                }
            }
            if now >= next_fps && !view.is_interrupted() {
                let fps = view.tick_fps();
                debug!("{}: {} fps", view.id(), fps);
                stats.fps_samples.push(fps);
                next_fps += self.fps_interval;
            }
        }

        if stats.last_scene.is_none() && !view.is_interrupted() {
            let viewport = view.viewport();
            stats.last_scene = Some(view.render(viewport));
        }
        stats
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}
