//! The UI-side view of a session's display.
//!
//! `DisplaySurface` owns the [`Compositor`], tracks where the presented
//! frame sits in the viewport and builds the [`Scene`] for each paint.

use crate::compositor::{Compositor, CompositorConfig, FrameReady, FrameSubmitter, Presentable};
use crate::layout::SurfaceLayout;
use crate::scene::{Color, Scene};
use crate::DisplayError;
use radic_common::{Point, Rect, Size};
use tracing::{debug, trace};

/// Counts renders and latches the count once per second.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FpsCounter {
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    pub fn record(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    /// Latch the frames counted since the previous tick and restart.
    pub fn tick(&mut self) -> u32 {
        self.fps = self.frames;
        self.frames = 0;
        self.fps
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

pub struct DisplaySurface {
    compositor: Compositor,
    layout: SurfaceLayout,
    fps: FpsCounter,
    show_fps: bool,
}

impl DisplaySurface {
    pub fn new(config: CompositorConfig) -> Result<Self, DisplayError> {
        let compositor = Compositor::spawn(config)?;
        let layout = SurfaceLayout {
            scale: compositor.scale(),
            ..SurfaceLayout::default()
        };
        Ok(Self {
            compositor,
            layout,
            fps: FpsCounter::default(),
            show_fps: true,
        })
    }

    pub fn submitter(&self) -> FrameSubmitter {
        self.compositor.submitter()
    }

    pub fn frame_ready(&self) -> flume::Receiver<FrameReady> {
        self.compositor.frame_ready()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn scale(&self) -> u32 {
        self.compositor.scale()
    }

    /// Change the integer scale (values below 1 become 1) and re-layout.
    pub fn set_scale(&mut self, scale: u32) {
        let scale = scale.max(1);
        self.compositor.set_scale(scale);
        self.layout = SurfaceLayout::compute(self.layout.frame, scale, self.layout.viewport);
        debug!("Surface scale -> {} ({})", scale, self.layout);
    }

    pub fn set_fps_overlay(&mut self, show: bool) {
        self.show_fps = show;
    }

    /// Recompute the frame placement for `viewport`.
    pub fn layout(&mut self, viewport: Size) -> SurfaceLayout {
        let snapshot = self.compositor.snapshot();
        self.relayout(viewport, snapshot.as_ref())
    }

    /// The most recently computed placement.
    pub fn current_layout(&self) -> SurfaceLayout {
        self.layout
    }

    /// Viewport position to remote desktop position.
    pub fn map_point_to_remote(&self, point: Point) -> Point {
        self.layout.map_to_remote(point)
    }

    pub fn map_point_to_local(&self, point: Point) -> Point {
        self.layout.map_to_local(point)
    }

    /// Build the display list for one paint of `viewport`.
    ///
    /// Placement follows the presentable copy actually shown, so a scale
    /// change becomes visible together with its rebuilt image.
    pub fn render(&mut self, viewport: Size) -> Scene {
        let snapshot = self.compositor.snapshot();
        let layout = self.relayout(viewport, snapshot.as_ref());
        self.fps.record();

        let mut scene = Scene::new(viewport);
        scene.fill(Rect::from_size(viewport), Color::BACKGROUND);

        let Some(presentable) = snapshot else {
            trace!("No frame yet, painting background only");
            return scene;
        };

        let (x, y) = (layout.origin.x, layout.origin.y);
        let (w, h) = (presentable.image.width(), presentable.image.height());
        push_inset_border(&mut scene, Rect::new(x, y, w, h));
        scene.image(layout.origin, presentable.image);

        if self.show_fps {
            scene.text(Point::new(4, 4), format!("FPS: {}", self.fps.fps()), Color::BLACK);
        }
        scene
    }

    /// Latch the render count; call once per second.
    pub fn tick_fps(&mut self) -> u32 {
        self.fps.tick()
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    pub fn shutdown(&mut self) {
        self.compositor.shutdown();
    }

    fn relayout(&mut self, viewport: Size, snapshot: Option<&Presentable>) -> SurfaceLayout {
        let (frame, scale) = match snapshot {
            Some(p) => (p.frame_size, p.scale),
            None => (Size::default(), self.compositor.scale()),
        };
        let layout = SurfaceLayout::compute(frame, scale, viewport);
        if layout != self.layout {
            trace!("Relayout: {}", layout);
            self.layout = layout;
        }
        layout
    }
}

/// Sunken frame around `image`: black one pixel out, gray top/left and
/// white bottom/right lines another pixel out.
fn push_inset_border(scene: &mut Scene, image: Rect) {
    let (x, y, w, h) = (image.x, image.y, image.width, image.height);
    scene.fill(Rect::new(x - 1, y - 1, w + 2, h + 2), Color::BLACK);
    scene.fill(Rect::new(x - 2, y - 2, w + 2, 1), Color::SHADOW);
    scene.fill(Rect::new(x - 2, y - 2, 1, h + 2), Color::SHADOW);
    scene.fill(Rect::new(x, y + h as i32 + 1, w + 2, 1), Color::WHITE);
    scene.fill(Rect::new(x + w as i32 + 1, y, 1, h + 2), Color::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawOp;
    use radic_pixelbuffer::{ManagedPixelBuffer, PixelFormat};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn surface_with_frame(w: u32, h: u32) -> DisplaySurface {
        let surface = DisplaySurface::new(CompositorConfig::default()).unwrap();
        let ready = surface.frame_ready();
        surface.submitter().submit(
            ManagedPixelBuffer::filled(w, h, PixelFormat::rgb888(), [0, 0, 0, 255]),
            Rect::default(),
        );
        ready.recv_timeout(WAIT).unwrap();
        surface
    }

    #[test]
    fn test_render_without_frame_is_background_only() {
        let mut surface = DisplaySurface::new(CompositorConfig::default()).unwrap();
        let scene = surface.render(Size::new(50, 40));
        assert_eq!(
            scene.ops,
            vec![DrawOp::Fill {
                rect: Rect::new(0, 0, 50, 40),
                color: Color::BACKGROUND
            }]
        );
    }

    #[test]
    fn test_render_places_border_and_image() {
        let mut surface = surface_with_frame(100, 100);
        let scene = surface.render(Size::new(300, 300));

        assert!(scene.has_image());
        assert!(scene.ops.contains(&DrawOp::Fill {
            rect: Rect::new(99, 99, 102, 102),
            color: Color::BLACK
        }));
        assert!(scene.ops.contains(&DrawOp::Fill {
            rect: Rect::new(98, 98, 102, 1),
            color: Color::SHADOW
        }));
        assert!(scene.ops.contains(&DrawOp::Fill {
            rect: Rect::new(201, 100, 1, 102),
            color: Color::WHITE
        }));
        assert_eq!(scene.overlay_text(), Some("FPS: 0"));

        let painted = scene.rasterize().unwrap();
        assert_eq!(painted.rgb_at(99, 150), Some([0, 0, 0, 255]));
        assert_eq!(painted.rgb_at(98, 150), Some([128, 128, 128, 255]));
        assert_eq!(painted.rgb_at(201, 150), Some([255, 255, 255, 255]));
        assert_eq!(painted.rgb_at(10, 10), Some([192, 192, 192, 255]));
    }

    #[test]
    fn test_mapping_follows_layout() {
        let mut surface = surface_with_frame(100, 100);
        let layout = surface.layout(Size::new(300, 300));
        assert_eq!(layout.origin, Point::new(100, 100));
        assert_eq!(surface.map_point_to_remote(Point::new(105, 110)), Point::new(5, 10));
        assert_eq!(surface.map_point_to_local(Point::new(5, 10)), Point::new(105, 110));
    }

    #[test]
    fn test_fps_overlay_and_counter() {
        let mut surface = surface_with_frame(10, 10);
        for _ in 0..3 {
            surface.render(Size::new(20, 20));
        }
        assert_eq!(surface.tick_fps(), 3);
        assert_eq!(surface.tick_fps(), 0);

        surface.set_fps_overlay(false);
        assert_eq!(surface.render(Size::new(20, 20)).overlay_text(), None);
    }

    #[test]
    fn test_set_scale_clamps_to_one() {
        let mut surface = DisplaySurface::new(CompositorConfig::default()).unwrap();
        surface.set_scale(0);
        assert_eq!(surface.scale(), 1);
        surface.set_scale(2);
        assert_eq!(surface.scale(), 2);
        assert_eq!(surface.current_layout().scale, 2);
    }
}
