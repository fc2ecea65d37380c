//! Background frame composition.
//!
//! The compositor owns one worker thread. Session backends push frames
//! through a [`FrameSubmitter`] into a latest-wins [`FrameSlot`]; the worker
//! copies each frame's dirty region into the composited buffer, derives the
//! scaled presentable copy and publishes it as an `Arc` swap. The UI thread
//! only ever clones that `Arc` via [`Compositor::snapshot`].

use crate::scaling::{scale_buffer, ScaleFilter};
use crate::slot::{FrameSlot, Recv};
use crate::{DisplayError, Frame};
use parking_lot::Mutex;
use radic_common::{Rect, Size};
use radic_pixelbuffer::{ManagedPixelBuffer, MutablePixelBuffer};
use radic_session::FrameSink;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, trace, warn};

/// Compositor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositorConfig {
    /// Initial presentation scale.
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default)]
    pub filter: ScaleFilter,
}

fn default_scale() -> u32 {
    1
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            filter: ScaleFilter::default(),
        }
    }
}

/// Notification that a new presentable copy is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReady {
    pub generation: u64,
    pub frame_size: Size,
    pub scale: u32,
}

/// The published, ready-to-paint copy of the latest frame.
#[derive(Debug, Clone)]
pub struct Presentable {
    pub image: Arc<ManagedPixelBuffer>,
    /// Size of the unscaled frame the image was derived from.
    pub frame_size: Size,
    pub scale: u32,
    pub generation: u64,
}

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositorStats {
    pub submitted: u64,
    /// Frames replaced in the slot before the worker took them.
    pub replaced: u64,
    pub composed: u64,
}

struct Output {
    composited: Option<ManagedPixelBuffer>,
    presentable: Option<Presentable>,
    scale: u32,
    filter: ScaleFilter,
    generation: u64,
}

struct Shared {
    slot: FrameSlot<Frame>,
    output: Mutex<Output>,
    interrupted: AtomicBool,
    submitted: AtomicU64,
    replaced: AtomicU64,
    composed: AtomicU64,
    ready: flume::Sender<FrameReady>,
}

impl Shared {
    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn compose(&self, frame: Frame) {
        if frame.is_null() {
            trace!("Ignoring null frame");
            return;
        }

        let (composited, scale, filter) = {
            let mut out = self.output.lock();
            (out.composited.take(), out.scale, out.filter)
        };

        let (mut target, dirty) = match composited {
            Some(buffer)
                if buffer.size() == frame.size() && buffer.format() == frame.buffer().format() =>
            {
                (buffer, frame.dirty())
            }
            previous => {
                if let Some(previous) = previous {
                    debug!(
                        "Frame size changed {} -> {}, reallocating output",
                        previous.size(),
                        frame.size()
                    );
                }
                let size = frame.size();
                (
                    ManagedPixelBuffer::new(size.width, size.height, *frame.buffer().format()),
                    Rect::from_size(size),
                )
            }
        };

        if let Err(e) = target.blit_from(frame.buffer(), dirty) {
            warn!("Dropping frame, dirty copy failed: {}", e);
            return;
        }

        let image = present(&target, scale, filter);
        self.publish(target, image, scale);
        self.composed.fetch_add(1, Ordering::Relaxed);
    }

    fn rescale(&self) {
        let (composited, scale, filter) = {
            let out = self.output.lock();
            (out.composited.clone(), out.scale, out.filter)
        };
        if let Some(composited) = composited {
            trace!("Rebuilding presentable at scale {}", scale);
            let image = present(&composited, scale, filter);
            self.publish(composited, image, scale);
        }
    }

    fn publish(&self, composited: ManagedPixelBuffer, image: ManagedPixelBuffer, scale: u32) {
        let frame_size = composited.size();
        let generation = {
            let mut out = self.output.lock();
            out.generation += 1;
            out.presentable = Some(Presentable {
                image: Arc::new(image),
                frame_size,
                scale,
                generation: out.generation,
            });
            out.composited = Some(composited);
            out.generation
        };

        // A full channel already carries a pending notification.
        let _ = self.ready.try_send(FrameReady {
            generation,
            frame_size,
            scale,
        });
    }
}

fn present(composited: &ManagedPixelBuffer, scale: u32, filter: ScaleFilter) -> ManagedPixelBuffer {
    match scale_buffer(composited, scale, filter) {
        Ok(image) => image,
        Err(e) => {
            warn!("Scaling failed, presenting unscaled: {}", e);
            composited.clone()
        }
    }
}

fn run_worker(shared: Arc<Shared>) {
    debug!("Compositor worker started");
    loop {
        match shared.slot.recv() {
            Recv::Closed => break,
            _ if shared.is_interrupted() => break,
            Recv::Value(frame) => shared.compose(frame),
            Recv::Woken => shared.rescale(),
        }
    }
    debug!("Compositor worker exiting");
}

/// Producer handle; cheap to clone and safe to use from any thread.
#[derive(Clone)]
pub struct FrameSubmitter {
    shared: Arc<Shared>,
}

impl FrameSubmitter {
    /// Store a frame for composition, replacing any frame not yet taken.
    ///
    /// Returns `false` after shutdown, when the frame is dropped.
    pub fn submit(&self, buffer: ManagedPixelBuffer, dirty: Rect) -> bool {
        if self.shared.is_interrupted() {
            return false;
        }
        let frame = Frame::new(buffer, dirty);
        self.shared.submitted.fetch_add(1, Ordering::Relaxed);
        let replaced = &self.shared.replaced;
        self.shared.slot.send_with(|pending| match pending {
            Some(older) => {
                replaced.fetch_add(1, Ordering::Relaxed);
                frame.absorb(older)
            }
            None => frame,
        })
    }
}

impl FrameSink for FrameSubmitter {
    fn submit_frame(&self, buffer: ManagedPixelBuffer, dirty: Rect) {
        self.submit(buffer, dirty);
    }
}

/// Owner of the compositor worker thread.
pub struct Compositor {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    ready: flume::Receiver<FrameReady>,
}

impl Compositor {
    /// Start the worker thread.
    pub fn spawn(config: CompositorConfig) -> Result<Self, DisplayError> {
        let (ready_tx, ready_rx) = flume::bounded(1);
        let shared = Arc::new(Shared {
            slot: FrameSlot::new(),
            output: Mutex::new(Output {
                composited: None,
                presentable: None,
                scale: config.scale.max(1),
                filter: config.filter,
                generation: 0,
            }),
            interrupted: AtomicBool::new(false),
            submitted: AtomicU64::new(0),
            replaced: AtomicU64::new(0),
            composed: AtomicU64::new(0),
            ready: ready_tx,
        });

        let worker = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("compositor".to_string())
                .spawn(move || run_worker(shared))
                .map_err(DisplayError::Spawn)?
        };

        info!(
            "Compositor started (scale {}, filter {})",
            config.scale.max(1),
            config.filter
        );
        Ok(Self {
            shared,
            worker: Some(worker),
            ready: ready_rx,
        })
    }

    pub fn submitter(&self) -> FrameSubmitter {
        FrameSubmitter {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Channel signalled after each publish; at most one notification is
    /// pending at a time.
    pub fn frame_ready(&self) -> flume::Receiver<FrameReady> {
        self.ready.clone()
    }

    /// The latest presentable copy, if any frame has been composed.
    pub fn snapshot(&self) -> Option<Presentable> {
        self.shared.output.lock().presentable.clone()
    }

    pub fn scale(&self) -> u32 {
        self.shared.output.lock().scale
    }

    /// Change the presentation scale; the worker rebuilds the presentable
    /// copy without waiting for a new frame.
    pub fn set_scale(&self, scale: u32) {
        if self.shared.is_interrupted() {
            return;
        }
        let scale = scale.max(1);
        {
            let mut out = self.shared.output.lock();
            if out.scale == scale {
                return;
            }
            out.scale = scale;
        }
        debug!("Compositor scale -> {}", scale);
        self.shared.slot.wake();
    }

    pub fn set_filter(&self, filter: ScaleFilter) {
        if self.shared.is_interrupted() {
            return;
        }
        {
            let mut out = self.shared.output.lock();
            if out.filter == filter {
                return;
            }
            out.filter = filter;
        }
        self.shared.slot.wake();
    }

    /// The remote desktop is being resized to `size`: drop the composited
    /// buffer when it no longer matches so the next frame is composed whole.
    pub fn resize_buffers(&self, size: Size) {
        if self.shared.is_interrupted() {
            return;
        }
        let mut out = self.shared.output.lock();
        if out
            .composited
            .as_ref()
            .is_some_and(|buffer| buffer.size() != size)
        {
            debug!("Discarding composited buffer for resize to {}", size);
            out.composited = None;
        }
    }

    pub fn stats(&self) -> CompositorStats {
        CompositorStats {
            submitted: self.shared.submitted.load(Ordering::Relaxed),
            replaced: self.shared.replaced.load(Ordering::Relaxed),
            composed: self.shared.composed.load(Ordering::Relaxed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stop and join the worker. Idempotent.
    pub fn shutdown(&mut self) {
        self.shared.interrupted.store(true, Ordering::SeqCst);
        self.shared.slot.close();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Compositor worker panicked");
            }
            info!("Compositor stopped");
        }
    }
}

impl Drop for Compositor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radic_pixelbuffer::PixelFormat;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn solid(w: u32, h: u32, rgb: [u8; 4]) -> ManagedPixelBuffer {
        ManagedPixelBuffer::filled(w, h, PixelFormat::rgb888(), rgb)
    }

    #[test]
    fn test_first_frame_is_published() {
        let compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let ready = compositor.frame_ready();
        assert!(compositor.snapshot().is_none());

        assert!(compositor
            .submitter()
            .submit(solid(40, 30, [255, 0, 0, 255]), Rect::default()));
        let note = ready.recv_timeout(WAIT).unwrap();
        assert_eq!(note.frame_size, Size::new(40, 30));

        let snap = compositor.snapshot().unwrap();
        assert_eq!(snap.image.size(), Size::new(40, 30));
        assert_eq!(snap.image.rgb_at(39, 29), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_null_frame_is_ignored() {
        let compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let ready = compositor.frame_ready();
        compositor
            .submitter()
            .submit(solid(0, 0, [0, 0, 0, 255]), Rect::default());
        assert!(ready.recv_timeout(Duration::from_millis(100)).is_err());
        assert!(compositor.snapshot().is_none());
    }

    #[test]
    fn test_set_scale_rebuilds_without_new_frame() {
        let compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let ready = compositor.frame_ready();
        compositor
            .submitter()
            .submit(solid(10, 10, [9, 9, 9, 255]), Rect::default());
        ready.recv_timeout(WAIT).unwrap();

        compositor.set_scale(2);
        let note = ready.recv_timeout(WAIT).unwrap();
        assert_eq!(note.scale, 2);
        let snap = compositor.snapshot().unwrap();
        assert_eq!(snap.image.size(), Size::new(20, 20));
        assert_eq!(snap.frame_size, Size::new(10, 10));
    }

    #[test]
    fn test_resize_buffers_forces_whole_compose() {
        let compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let ready = compositor.frame_ready();
        let submitter = compositor.submitter();

        submitter.submit(solid(10, 10, [255, 255, 255, 255]), Rect::default());
        ready.recv_timeout(WAIT).unwrap();

        compositor.resize_buffers(Size::new(20, 20));
        // Only a corner is declared dirty, but the new geometry is composed whole.
        submitter.submit(solid(20, 20, [0, 0, 255, 255]), Rect::new(0, 0, 1, 1));
        ready.recv_timeout(WAIT).unwrap();
        let snap = compositor.snapshot().unwrap();
        assert_eq!(snap.image.rgb_at(19, 19), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_shutdown_releases_worker_state() {
        let mut compositor = Compositor::spawn(CompositorConfig::default()).unwrap();
        let submitter = compositor.submitter();
        // Worker is blocked in recv with nothing pending.
        std::thread::sleep(Duration::from_millis(20));
        compositor.shutdown();

        assert!(!compositor.is_running());
        assert!(!submitter.submit(solid(4, 4, [0, 0, 0, 255]), Rect::default()));
        // Only this handle and the submitter remain; the worker's clone is gone.
        assert_eq!(Arc::strong_count(&compositor.shared), 2);
        drop(submitter);
        assert_eq!(Arc::strong_count(&compositor.shared), 1);

        compositor.set_scale(3);
        assert_eq!(compositor.scale(), 1);
        compositor.shutdown();
    }
}
