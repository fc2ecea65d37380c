//! Owned pixel storage.
//!
//! [`ManagedPixelBuffer`] is the concrete buffer type that flows through the
//! whole pipeline: session backends hand one over per frame, the compositor
//! keeps one as its output, and the display surface paints from one.
//!
//! # Example
//!
//! ```
//! use radic_pixelbuffer::{ManagedPixelBuffer, MutablePixelBuffer, PixelBuffer, PixelFormat};
//! use radic_common::Rect;
//!
//! let mut buffer = ManagedPixelBuffer::new(100, 100, PixelFormat::rgb888());
//! let red = buffer.pixel_format().from_rgb888([255, 0, 0, 255]);
//! buffer.fill_rect(Rect::new(10, 10, 50, 50), &red).unwrap();
//! assert_eq!(buffer.pixel(20, 20), Some(&red[..]));
//! ```

use crate::{MutablePixelBuffer, PixelBuffer, PixelFormat};
use anyhow::{anyhow, Result};
use radic_common::{Rect, Size};
use std::borrow::Cow;

/// A pixel buffer that owns its memory.
///
/// Rows are `stride` pixels apart. Buffers created with [`new`](Self::new)
/// are tightly packed (`stride == width`); [`from_raw`](Self::from_raw)
/// accepts producer data with row padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
    /// Stride in **pixels**
    stride: usize,
}

impl ManagedPixelBuffer {
    /// Creates a zero-filled buffer (black for the supported formats).
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let stride = width as usize;
        let bytes_per_pixel = format.bytes_per_pixel() as usize;
        let data = vec![0u8; stride * height as usize * bytes_per_pixel];

        Self {
            width,
            height,
            format,
            data,
            stride,
        }
    }

    /// Wraps producer-supplied pixel data.
    ///
    /// # Errors
    ///
    /// Fails when `stride < width` or `data` is too short for
    /// `height` rows of `stride` pixels.
    pub fn from_raw(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self> {
        if stride < width as usize {
            return Err(anyhow!(
                "Stride {} is smaller than width {}",
                stride,
                width
            ));
        }
        let required = stride * height as usize * format.bytes_per_pixel() as usize;
        if data.len() < required {
            return Err(anyhow!(
                "Insufficient pixel data: got {} bytes, need {}",
                data.len(),
                required
            ));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
            stride,
        })
    }

    /// Creates a buffer filled with one color.
    pub fn filled(width: u32, height: u32, format: PixelFormat, rgb: [u8; 4]) -> Self {
        let mut buffer = Self::new(width, height, format);
        let pixel = format.from_rgb888(rgb);
        if pixel.iter().any(|&b| b != 0) {
            for chunk in buffer.data.chunks_exact_mut(pixel.len()) {
                chunk.copy_from_slice(&pixel);
            }
        }
        buffer
    }

    /// Reallocates to new dimensions. Existing pixel data is discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height, self.format);
    }

    /// Returns the stride in pixels.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns a reference to the raw pixel data, including any row padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel data with row padding removed.
    pub fn packed_data(&self) -> Cow<'_, [u8]> {
        let bpp = self.format.bytes_per_pixel() as usize;
        let row_bytes = self.width as usize * bpp;
        let packed_len = row_bytes * self.height as usize;
        if self.stride == self.width as usize {
            return Cow::Borrowed(&self.data[..packed_len]);
        }
        let mut packed = Vec::with_capacity(packed_len);
        for row in self.data.chunks(self.stride * bpp).take(self.height as usize) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        Cow::Owned(packed)
    }

    /// Returns the buffer width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the buffer height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True for a buffer with no pixels.
    pub fn is_null(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns a reference to the pixel format.
    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    /// Bytes of the pixel at (x, y), `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel() as usize;
        let offset = (y as usize * self.stride + x as usize) * bpp;
        self.data.get(offset..offset + bpp)
    }

    /// Decoded `[r, g, b, 255]` at (x, y).
    pub fn rgb_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixel(x, y).map(|p| self.format.to_rgb888(p))
    }

    fn validate_rect(&self, rect: Rect) -> Result<()> {
        if rect.x < 0
            || rect.y < 0
            || rect.x as u64 + rect.width as u64 > self.width as u64
            || rect.y as u64 + rect.height as u64 > self.height as u64
        {
            return Err(anyhow!(
                "Rectangle out of bounds: {:?} (buffer size: {}x{})",
                rect,
                self.width,
                self.height
            ));
        }
        Ok(())
    }
}

impl PixelBuffer for ManagedPixelBuffer {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel_format(&self) -> &PixelFormat {
        &self.format
    }

    fn get_buffer(&self, rect: Rect, stride: &mut usize) -> Option<&[u8]> {
        if rect.is_empty() || self.validate_rect(rect).is_err() {
            return None;
        }

        *stride = self.stride;
        let bpp = self.format.bytes_per_pixel() as usize;
        let start = (rect.y as usize * self.stride + rect.x as usize) * bpp;
        let len = ((rect.height as usize - 1) * self.stride + rect.width as usize) * bpp;

        self.data.get(start..start + len)
    }
}

impl MutablePixelBuffer for ManagedPixelBuffer {
    fn fill_rect(&mut self, rect: Rect, pixel: &[u8]) -> Result<()> {
        self.validate_rect(rect)?;

        let bpp = self.format.bytes_per_pixel() as usize;
        if pixel.len() != bpp {
            return Err(anyhow!(
                "Invalid pixel size: got {} bytes, expected {}",
                pixel.len(),
                bpp
            ));
        }

        for y in 0..rect.height as usize {
            let row_offset = ((rect.y as usize + y) * self.stride + rect.x as usize) * bpp;
            let row = &mut self.data[row_offset..row_offset + rect.width as usize * bpp];
            for dst in row.chunks_exact_mut(bpp) {
                dst.copy_from_slice(pixel);
            }
        }

        Ok(())
    }

    fn image_rect(&mut self, dest: Rect, pixels: &[u8], stride: usize) -> Result<()> {
        self.validate_rect(dest)?;
        if dest.is_empty() {
            return Ok(());
        }

        let bpp = self.format.bytes_per_pixel() as usize;
        let rect_width_bytes = dest.width as usize * bpp;
        let src_stride = if stride == 0 {
            dest.width as usize
        } else {
            stride
        };
        let src_stride_bytes = src_stride * bpp;

        let required = src_stride_bytes * (dest.height as usize - 1) + rect_width_bytes;
        if pixels.len() < required {
            return Err(anyhow!(
                "Insufficient source data: got {} bytes, need at least {}",
                pixels.len(),
                required
            ));
        }

        for y in 0..dest.height as usize {
            let dst_offset = ((dest.y as usize + y) * self.stride + dest.x as usize) * bpp;
            let src_offset = y * src_stride_bytes;
            self.data[dst_offset..dst_offset + rect_width_bytes]
                .copy_from_slice(&pixels[src_offset..src_offset + rect_width_bytes]);
        }

        Ok(())
    }
}
