//! Display lists produced by [`DisplaySurface::render`](crate::DisplaySurface::render)
//! and a small software painter for them.
//!
//! A windowed shell translates the ops into its own drawing calls; headless
//! shells and tests call [`Scene::rasterize`] instead.

use crate::DisplayError;
use radic_common::{Point, Rect, Size};
use radic_pixelbuffer::{ManagedPixelBuffer, MutablePixelBuffer, PixelBuffer, PixelFormat};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Surround of the presented frame.
    pub const BACKGROUND: Color = Color::rgb(192, 192, 192);
    /// Shadow side of the inset border.
    pub const SHADOW: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_rgb888(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill { rect: Rect, color: Color },
    /// The presentable image with its top-left at `origin`.
    Image {
        origin: Point,
        image: Arc<ManagedPixelBuffer>,
    },
    Text {
        origin: Point,
        text: String,
        color: Color,
    },
}

/// Ordered drawing operations for one viewport-sized paint.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub ops: Vec<DrawOp>,
}

impl Scene {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn fill(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::Fill { rect, color });
    }

    pub fn image(&mut self, origin: Point, image: Arc<ManagedPixelBuffer>) {
        self.ops.push(DrawOp::Image { origin, image });
    }

    pub fn text(&mut self, origin: Point, text: impl Into<String>, color: Color) {
        self.ops.push(DrawOp::Text {
            origin,
            text: text.into(),
            color,
        });
    }

    /// True when the scene paints a frame image.
    pub fn has_image(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, DrawOp::Image { .. }))
    }

    /// The overlay text, if any.
    pub fn overlay_text(&self) -> Option<&str> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Paint the scene into an RGB888 buffer of `self.size`.
    ///
    /// Operations are clipped to the scene bounds. Text is not rasterised.
    pub fn rasterize(&self) -> Result<ManagedPixelBuffer, DisplayError> {
        let format = PixelFormat::rgb888();
        let mut target = ManagedPixelBuffer::new(self.size.width, self.size.height, format);
        let bounds = Rect::from_size(self.size);

        for op in &self.ops {
            match op {
                DrawOp::Fill { rect, color } => {
                    if let Some(clip) = rect.intersect(&bounds) {
                        target.fill_rect(clip, &format.from_rgb888(color.to_rgb888()))?;
                    }
                }
                DrawOp::Image { origin, image } => {
                    paint_image(&mut target, bounds, *origin, image)?;
                }
                DrawOp::Text { .. } => {}
            }
        }
        Ok(target)
    }

    /// Rasterise and write the scene as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), DisplayError> {
        let path = path.as_ref();
        let painted = self.rasterize()?;
        let mut rgba = Vec::with_capacity(painted.size().area() as usize * 4);
        for y in 0..painted.height() {
            for x in 0..painted.width() {
                rgba.extend_from_slice(&painted.rgb_at(x, y).unwrap_or([0, 0, 0, 255]));
            }
        }
        image::save_buffer(
            path,
            &rgba,
            painted.width(),
            painted.height(),
            image::ColorType::Rgba8,
        )?;
        debug!("Saved {} scene to {}", self.size, path.display());
        Ok(())
    }
}

fn paint_image(
    target: &mut ManagedPixelBuffer,
    bounds: Rect,
    origin: Point,
    image: &ManagedPixelBuffer,
) -> Result<(), DisplayError> {
    let placed = Rect::new(origin.x, origin.y, image.width(), image.height());
    let Some(clip) = placed.intersect(&bounds) else {
        return Ok(());
    };
    let source = clip.offset(-origin.x, -origin.y);

    if image.format() == target.format() {
        let mut stride = 0;
        if let Some(pixels) = image.get_buffer(source, &mut stride) {
            target.image_rect(clip, pixels, stride)?;
        }
        return Ok(());
    }

    let format = *target.format();
    let mut row = Vec::with_capacity(clip.width as usize * format.bytes_per_pixel() as usize);
    for dy in 0..clip.height {
        row.clear();
        for dx in 0..clip.width {
            let rgb = image
                .rgb_at(source.x as u32 + dx, source.y as u32 + dy)
                .unwrap_or([0, 0, 0, 255]);
            row.extend_from_slice(&format.from_rgb888(rgb));
        }
        let line = Rect::new(clip.x, clip.y + dy as i32, clip.width, 1);
        target.image_rect(line, &row, clip.width as usize)?;
    }
    Ok(())
}
