//! Pixel buffer traits.
//!
//! - [`PixelBuffer`]: read-only access to pixel data
//! - [`MutablePixelBuffer`]: read-write access with the handful of rendering
//!   operations the compositor and the software painter need
//!
//! All strides are in **pixels**, not bytes.

use crate::PixelFormat;
use anyhow::{anyhow, bail, Result};
use radic_common::Rect;

/// Read-only pixel buffer access.
pub trait PixelBuffer {
    /// Returns the dimensions of the pixel buffer as (width, height).
    fn dimensions(&self) -> (u32, u32);

    /// Returns a reference to the pixel format used by this buffer.
    fn pixel_format(&self) -> &PixelFormat;

    /// Gets read-only access to a rectangular region of pixel data.
    ///
    /// The returned slice starts at the rectangle's top-left pixel and ends
    /// at its bottom-right pixel; rows are `stride` pixels apart. Returns
    /// `None` when the rectangle is empty or out of bounds.
    fn get_buffer(&self, rect: Rect, stride: &mut usize) -> Option<&[u8]>;
}

/// Mutable pixel buffer with rendering operations.
pub trait MutablePixelBuffer: PixelBuffer {
    /// Fills a rectangle with a solid pixel value (already encoded in the
    /// buffer's format).
    fn fill_rect(&mut self, rect: Rect, pixel: &[u8]) -> Result<()>;

    /// Copies image data into a rectangle.
    ///
    /// `stride` is the source stride in pixels; 0 means tightly packed.
    fn image_rect(&mut self, dest: Rect, pixels: &[u8], stride: usize) -> Result<()>;

    /// Copies `rect` from `src` into the same position of this buffer.
    ///
    /// Both buffers must share a pixel format and contain `rect`.
    fn blit_from(&mut self, src: &dyn PixelBuffer, rect: Rect) -> Result<()> {
        if src.pixel_format() != self.pixel_format() {
            bail!(
                "Pixel format mismatch: source {:?}, destination {:?}",
                src.pixel_format(),
                self.pixel_format()
            );
        }
        let mut stride = 0;
        let pixels = src
            .get_buffer(rect, &mut stride)
            .ok_or_else(|| anyhow!("Source rectangle out of bounds: {:?}", rect))?;
        self.image_rect(rect, pixels, stride)
    }
}
