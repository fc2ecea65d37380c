//! Placement of the presented frame inside the viewport and the mapping
//! between viewport and remote coordinates.

use radic_common::{Point, Rect, Size};
use std::fmt;

/// Where the scaled frame sits in the viewport.
///
/// A frame that fits is centred on both axes. On horizontal overflow the
/// frame is anchored to the left edge; on vertical overflow it is anchored
/// to the bottom edge (its origin goes negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceLayout {
    pub viewport: Size,
    pub frame: Size,
    pub scale: u32,
    /// Top-left of the scaled frame in viewport coordinates.
    pub origin: Point,
}

impl SurfaceLayout {
    pub fn compute(frame: Size, scale: u32, viewport: Size) -> Self {
        let scale = scale.max(1);
        let scaled = frame.scaled_by(scale);
        let (w, h) = (scaled.width as i64, scaled.height as i64);
        let (vw, vh) = (viewport.width as i64, viewport.height as i64);

        let x = if w > vw { 0 } else { (vw - w) / 2 };
        let y = if h > vh { vh - h } else { (vh - h) / 2 };

        Self {
            viewport,
            frame,
            scale,
            origin: Point::new(clamp_i32(x), clamp_i32(y)),
        }
    }

    /// Size of the frame after scaling.
    pub fn scaled_size(&self) -> Size {
        self.frame.scaled_by(self.scale)
    }

    /// Viewport rectangle covered by the scaled frame.
    pub fn image_rect(&self) -> Rect {
        let size = self.scaled_size();
        Rect::new(self.origin.x, self.origin.y, size.width, size.height)
    }

    /// Viewport position to remote desktop position: subtract the origin,
    /// then divide by the scale (truncating toward zero).
    pub fn map_to_remote(&self, point: Point) -> Point {
        let scale = self.scale.max(1) as i32;
        Point::new(
            (point.x - self.origin.x) / scale,
            (point.y - self.origin.y) / scale,
        )
    }

    /// Remote desktop position to the viewport position of its top-left
    /// presented pixel.
    pub fn map_to_local(&self, point: Point) -> Point {
        let scale = self.scale.max(1) as i32;
        Point::new(
            point.x * scale + self.origin.x,
            point.y * scale + self.origin.y,
        )
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl fmt::Display for SurfaceLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout(viewport={}, frame={}, scale={}, origin={},{})",
            self.viewport, self.frame, self.scale, self.origin.x, self.origin.y
        )
    }
}
